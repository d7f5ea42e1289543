//! Miuix Layout
//!
//! The two scroll-driven containers of the Miuix component set:
//!
//! - **SpringBackLayout**: Turns unconsumed edge scroll into damped overscroll and springs back
//! - **AppBar**: Collapsing header whose offset follows nested scroll and snaps when released
//! - **Damping**: The overscroll curve and its inverse
//! - **Config**: `miuix.toml` loading for both components
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use miuix_animation::ManualClock;
//! use miuix_core::{NestedScrollSink, ScrollAxes, ScrollType};
//! use miuix_layout::{MiuixConfig, SpringBackLayout};
//!
//! let config = MiuixConfig::from_toml_str("[spring_back]\nspring_back_mode = \"top\"").unwrap();
//! let clock = ManualClock::new(0);
//! let mut layout = SpringBackLayout::new(&config.spring_back, Rc::new(clock));
//! assert!(layout.on_start_nested_scroll(ScrollAxes::VERTICAL, ScrollType::Touch));
//! ```

pub mod app_bar;
pub mod config;
pub mod damping;
pub mod helper;
pub mod springback;

pub use app_bar::{AppBar, AppBarRenderValues};
pub use config::{
    AppBarConfig, ConfigError, EdgeSetting, MiuixConfig, OrientationSetting, SpringBackConfig,
};
pub use helper::SpringBackLayoutHelper;
pub use springback::{SpringBackLayout, MAX_FLING_CONSUME_COUNTER, VELOCITY_THRESHOLD};
