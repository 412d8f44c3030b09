//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("Poll interval must be shorter than the reminder interval")]
    PollSlowerThanReminders,

    #[error("Invalid Telegram bot token format")]
    InvalidBotToken,

    #[error("Invalid URL for {0}")]
    InvalidUrl(&'static str),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}
