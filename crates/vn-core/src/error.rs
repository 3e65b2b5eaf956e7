//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// Errors raised by `vn-core` constructors and shared validation.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid space constraints on {axis}: min {min} must be below max {max}")]
    InvalidConstraints { axis: char, min: f32, max: f32 },

    #[error("level {level} is outside the configured {count} levels")]
    InvalidLevel { level: usize, count: usize },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `vn-core`.
pub type CoreResult<T> = Result<T, CoreError>;
