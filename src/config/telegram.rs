//! Telegram Bot API configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::TelegramConfig as GatewayConfig;

/// Telegram Bot API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather (`<bot id>:<secret>`)
    pub bot_token: Option<Secret<String>>,

    /// Bot API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for ordinary API requests in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// How long `getUpdates` may hold a connection, in seconds
    #[serde(default = "default_long_poll")]
    pub long_poll_secs: u64,
}

impl TelegramConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn long_poll(&self) -> Duration {
        Duration::from_secs(self.long_poll_secs)
    }

    /// Check if a bot token is configured
    pub fn has_bot_token(&self) -> bool {
        self.bot_token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty())
    }

    /// Adapter configuration, requiring a bot token
    pub fn gateway_config(&self) -> Result<GatewayConfig, ValidationError> {
        let token = self
            .bot_token
            .as_ref()
            .filter(|_| self.has_bot_token())
            .ok_or(ValidationError::MissingRequired("TELEGRAM__BOT_TOKEN"))?;

        Ok(GatewayConfig::new(token.expose_secret().clone())
            .with_base_url(self.base_url.clone())
            .with_request_timeout(self.request_timeout())
            .with_long_poll(self.long_poll()))
    }

    /// Validate Telegram configuration
    ///
    /// The token itself is optional here; commands that talk to Telegram
    /// require it through [`gateway_config`](Self::gateway_config).
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(token) = &self.bot_token {
            let token = token.expose_secret();
            if token.is_empty() || !token.contains(':') {
                return Err(ValidationError::InvalidBotToken);
            }
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidUrl("telegram.base_url"));
        }

        if self.request_timeout_secs == 0 {
            return Err(ValidationError::ZeroDuration("telegram.request_timeout_secs"));
        }

        Ok(())
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            long_poll_secs: default_long_poll(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_long_poll() -> u64 {
    25
}
