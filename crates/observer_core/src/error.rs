//! Error types for observer_core.
//!
//! The physics never signals errors; numeric guards handle degenerate input.
//! Only configuration and mode lookup can fail.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A mode name outside the closed set of observer modes.
    #[error("Unknown observer mode: {0}")]
    UnknownObserver(String),

    /// A configuration value failed validation.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

impl ConfigurationError {
    #[must_use]
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::Invalid(msg.into())
    }
}
