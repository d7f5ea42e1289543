//! Spring operator
//!
//! One integration step of a damped harmonic oscillator, parameterised by
//! damping ratio `ζ` and natural period `T`:
//!
//! ```text
//! ω         = 2π / T
//! stiffness = ω²
//! damping   = 2ζω
//! v'        = v·(1 − damping·dt) + stiffness·(target − x)·dt
//! ```
//!
//! The step is semi-implicit Euler and only stable for small `dt`; callers
//! clamp the frame delta before stepping.

use std::f64::consts::PI;

use miuix_core::error::{Result, SpringError};

/// Precomputed spring coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringOperator {
    damping: f64,
    stiffness: f64,
}

impl SpringOperator {
    /// Create an operator from a damping ratio and a natural period in seconds
    pub fn new(damping_ratio: f32, natural_period: f32) -> Result<Self> {
        if !natural_period.is_finite() || natural_period <= 0.0 {
            return Err(SpringError::InvalidPeriod(natural_period));
        }
        if !damping_ratio.is_finite() || damping_ratio < 0.0 {
            return Err(SpringError::InvalidDampingRatio(damping_ratio));
        }
        Ok(Self::from_valid(damping_ratio, natural_period))
    }

    /// Critically damped operator (`ζ = 1`)
    pub fn critically_damped(natural_period: f32) -> Result<Self> {
        Self::new(1.0, natural_period)
    }

    /// Coefficients for parameters already known to be in range
    pub(crate) fn from_valid(damping_ratio: f32, natural_period: f32) -> Self {
        let omega = 2.0 * PI / natural_period as f64;
        Self {
            damping: 2.0 * damping_ratio as f64 * omega,
            stiffness: omega * omega,
        }
    }

    /// Stiffness over mass (`ω²`)
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Damping coefficient (`2ζω`)
    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Advance the velocity by `dt` seconds
    #[inline]
    pub fn update_velocity(&self, velocity: f64, dt: f32, target: f64, current: f64) -> f64 {
        let dt = dt as f64;
        velocity * (1.0 - self.damping * dt) + self.stiffness * (target - current) * dt
    }
}
