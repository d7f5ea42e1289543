//! Miuix configuration file handling
//!
//! ```toml
//! [spring_back]
//! screen_height = 2400
//! spring_back_mode = "top"
//! orientation = "angle"
//!
//! [app_bar]
//! large_title_fade_end = 0.5
//! ```
//!
//! Every key is optional; missing keys take the stock Miuix values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use miuix_core::{OrientationMode, SpringBackMode};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not read the config file
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML or wrong value types
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values that parse but cannot be used
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration (miuix.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MiuixConfig {
    #[serde(default)]
    pub spring_back: SpringBackConfig,
    #[serde(default)]
    pub app_bar: AppBarConfig,
}

impl MiuixConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: MiuixConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.spring_back.validate()?;
        self.app_bar.validate()
    }
}

/// Which edges may overscroll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeSetting {
    Top,
    Bottom,
    #[default]
    Both,
    None,
}

impl From<EdgeSetting> for SpringBackMode {
    fn from(setting: EdgeSetting) -> Self {
        match setting {
            EdgeSetting::Top => SpringBackMode::TOP,
            EdgeSetting::Bottom => SpringBackMode::BOTTOM,
            EdgeSetting::Both => SpringBackMode::all(),
            EdgeSetting::None => SpringBackMode::empty(),
        }
    }
}

/// Axes that may overscroll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrientationSetting {
    #[default]
    Vertical,
    Horizontal,
    Angle,
}

impl From<OrientationSetting> for OrientationMode {
    fn from(setting: OrientationSetting) -> Self {
        match setting {
            OrientationSetting::Vertical => OrientationMode::Vertical,
            OrientationSetting::Horizontal => OrientationMode::Horizontal,
            OrientationSetting::Angle => OrientationMode::Angle,
        }
    }
}

/// Spring-back container settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SpringBackConfig {
    /// Damping range for horizontal overscroll (px)
    #[serde(default = "default_screen_width")]
    pub screen_width: i32,
    /// Damping range for vertical overscroll (px)
    #[serde(default = "default_screen_height")]
    pub screen_height: i32,
    /// Travel before a drag is recognised (px)
    #[serde(default = "default_touch_slop")]
    pub touch_slop: f32,
    #[serde(default)]
    pub spring_back_mode: EdgeSetting,
    #[serde(default)]
    pub orientation: OrientationSetting,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_screen_width() -> i32 {
    1080
}

fn default_screen_height() -> i32 {
    2400
}

fn default_touch_slop() -> f32 {
    22.0
}

fn default_true() -> bool {
    true
}

impl Default for SpringBackConfig {
    fn default() -> Self {
        Self {
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            touch_slop: default_touch_slop(),
            spring_back_mode: EdgeSetting::default(),
            orientation: OrientationSetting::default(),
            enabled: true,
        }
    }
}

impl SpringBackConfig {
    pub fn validate(&self) -> Result<()> {
        if self.screen_width <= 0 || self.screen_height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "screen size must be positive, got {}x{}",
                self.screen_width, self.screen_height
            )));
        }
        if !self.touch_slop.is_finite() || self.touch_slop < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "touch_slop must be a non-negative number, got {}",
                self.touch_slop
            )));
        }
        Ok(())
    }
}

/// Collapsing app bar settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppBarConfig {
    /// Collapse fraction at which the large title is fully transparent
    #[serde(default = "default_large_title_fade_end")]
    pub large_title_fade_end: f32,
    /// Collapse fraction at which the toolbar title starts to appear
    #[serde(default = "default_toolbar_fade_start")]
    pub toolbar_fade_start: f32,
    /// Collapse fraction at which the toolbar title is opaque
    #[serde(default = "default_toolbar_fade_end")]
    pub toolbar_fade_end: f32,
    /// Toolbar title stays hidden while the large title alpha is above this
    #[serde(default = "default_exclusive_alpha")]
    pub exclusive_alpha: f32,
    /// Snap fling speed before scaling (px/s)
    #[serde(default = "default_snap_base_velocity")]
    pub snap_base_velocity: f32,
    #[serde(default = "default_snap_min_multiplier")]
    pub snap_min_multiplier: f32,
    #[serde(default = "default_snap_max_multiplier")]
    pub snap_max_multiplier: f32,
    /// Exponent of the distance ratio in the snap speed curve
    #[serde(default = "default_snap_exponent")]
    pub snap_exponent: f32,
    /// Display density used by the snap fling physics (1.0 = 160 dpi)
    #[serde(default = "default_density")]
    pub density: f32,
}

fn default_large_title_fade_end() -> f32 {
    0.45
}

fn default_toolbar_fade_start() -> f32 {
    0.6
}

fn default_toolbar_fade_end() -> f32 {
    1.0
}

fn default_exclusive_alpha() -> f32 {
    0.05
}

fn default_snap_base_velocity() -> f32 {
    2000.0
}

fn default_snap_min_multiplier() -> f32 {
    0.3
}

fn default_snap_max_multiplier() -> f32 {
    2.0
}

fn default_snap_exponent() -> f32 {
    0.6
}

fn default_density() -> f32 {
    2.75
}

impl Default for AppBarConfig {
    fn default() -> Self {
        Self {
            large_title_fade_end: default_large_title_fade_end(),
            toolbar_fade_start: default_toolbar_fade_start(),
            toolbar_fade_end: default_toolbar_fade_end(),
            exclusive_alpha: default_exclusive_alpha(),
            snap_base_velocity: default_snap_base_velocity(),
            snap_min_multiplier: default_snap_min_multiplier(),
            snap_max_multiplier: default_snap_max_multiplier(),
            snap_exponent: default_snap_exponent(),
            density: default_density(),
        }
    }
}

impl AppBarConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.large_title_fade_end > 0.0 && self.large_title_fade_end <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "large_title_fade_end must be in (0, 1], got {}",
                self.large_title_fade_end
            )));
        }
        if !(0.0..1.0).contains(&self.toolbar_fade_start)
            || self.toolbar_fade_end <= self.toolbar_fade_start
            || self.toolbar_fade_end > 1.0
        {
            return Err(ConfigError::Invalid(format!(
                "toolbar fade window [{}, {}] must be increasing inside [0, 1]",
                self.toolbar_fade_start, self.toolbar_fade_end
            )));
        }
        if self.snap_min_multiplier <= 0.0 || self.snap_max_multiplier < self.snap_min_multiplier {
            return Err(ConfigError::Invalid(format!(
                "snap multipliers must satisfy 0 < min <= max, got [{}, {}]",
                self.snap_min_multiplier, self.snap_max_multiplier
            )));
        }
        if self.snap_base_velocity <= 0.0 || self.density <= 0.0 {
            return Err(ConfigError::Invalid(
                "snap_base_velocity and density must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
