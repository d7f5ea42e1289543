//! Error types

use thiserror::Error;

/// Errors raised while configuring spring physics
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpringError {
    /// The natural period must be a positive, finite number of seconds
    #[error("Invalid spring period: {0} (must be > 0)")]
    InvalidPeriod(f32),

    /// The damping ratio must be finite and non-negative
    #[error("Invalid damping ratio: {0}")]
    InvalidDampingRatio(f32),
}

/// Result type for spring construction
pub type Result<T> = std::result::Result<T, SpringError>;
