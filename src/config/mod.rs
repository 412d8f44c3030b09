//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SURVEY_RELAY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use survey_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Surveys time out after {}s", config.survey.timeout_secs);
//! ```

mod ai;
mod error;
mod storage;
mod survey;
mod telegram;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use storage::StorageConfig;
pub use survey::SurveyConfig;
pub use telegram::TelegramConfig;

use serde::Deserialize;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root application configuration
///
/// Every section has defaults, so an empty environment loads. Secrets are
/// checked only by the commands that need them.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Survey timers (timeout, reminders, polling)
    #[serde(default)]
    pub survey: SurveyConfig,

    /// Telegram Bot API
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Request interpretation (Anthropic)
    #[serde(default)]
    pub ai: AiConfig,

    /// Survey storage location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Default log level when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SURVEY_RELAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SURVEY_RELAY__SURVEY__TIMEOUT_SECS=900` -> `survey.timeout_secs = 900`
    /// - `SURVEY_RELAY__TELEGRAM__BOT_TOKEN=...` -> `telegram.bot_token = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SURVEY_RELAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.survey.validate()?;
        self.telegram.validate()?;
        self.ai.validate()?;
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ValidationError::InvalidLogLevel(self.log_level.clone()));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            survey: SurveyConfig::default(),
            telegram: TelegramConfig::default(),
            ai: AiConfig::default(),
            storage: StorageConfig::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
