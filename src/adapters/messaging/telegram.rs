//! Telegram Bot API adapter.
//!
//! Implements both directions of chat traffic:
//! - `MessagingGateway` via `sendMessage`
//! - `ReplySource` via `getUpdates` long polling
//!
//! # Configuration
//!
//! ```ignore
//! let config = TelegramConfig::new(bot_token)
//!     .with_long_poll(Duration::from_secs(25));
//!
//! let telegram = TelegramGateway::new(config)?;
//! telegram.send(ChatId::new(-123456), "hello").await?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use crate::domain::foundation::{ChatId, ResponderId};
use crate::ports::{
    DeliveryError, DeliveryReceipt, InboundReply, MessagingGateway, ReplySource, ReplySourceError,
};

/// Configuration for the Telegram adapter.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    bot_token: Secret<String>,
    /// Base URL for the Bot API (default: https://api.telegram.org).
    pub base_url: String,
    /// Timeout for ordinary requests.
    pub request_timeout: Duration,
    /// How long `getUpdates` may hold the connection open.
    pub long_poll: Duration,
}

impl TelegramConfig {
    /// Creates a configuration with the given bot token.
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: Secret::new(bot_token.into()),
            base_url: "https://api.telegram.org".to_string(),
            request_timeout: Duration::from_secs(30),
            long_poll: Duration::from_secs(25),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the long-poll hold time.
    pub fn with_long_poll(mut self, long_poll: Duration) -> Self {
        self.long_poll = long_poll;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.base_url.trim_end_matches('/'),
            self.bot_token.expose_secret(),
            method
        )
    }
}

/// Telegram Bot API client.
pub struct TelegramGateway {
    config: TelegramConfig,
    client: Client,
    /// Next `update_id` to request; everything below is acknowledged.
    next_offset: AtomicI64,
}

impl TelegramGateway {
    /// Creates a gateway with the given configuration.
    pub fn new(config: TelegramConfig) -> Result<Self, DeliveryError> {
        // long polls hold the connection, so the client timeout must cover them
        let client = Client::builder()
            .timeout(config.request_timeout + config.long_poll)
            .build()
            .map_err(|e| DeliveryError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            next_offset: AtomicI64::new(0),
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> DeliveryError {
        if e.is_timeout() {
            DeliveryError::Timeout {
                timeout_secs: self.config.request_timeout.as_secs(),
            }
        } else if e.is_connect() {
            DeliveryError::network(format!("Connection failed: {}", e))
        } else {
            DeliveryError::network(e.to_string())
        }
    }
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<DeliveryReceipt, DeliveryError> {
        tracing::debug!(chat_id = %chat_id, "Sending Telegram message");

        let response = self
            .client
            .post(self.config.method_url("sendMessage"))
            .timeout(self.config.request_timeout)
            .json(&SendMessageRequest {
                chat_id: chat_id.value(),
                text,
            })
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status().as_u16();
        let body: ApiResponse<SentMessage> = response
            .json()
            .await
            .map_err(|e| DeliveryError::InvalidResponse(e.to_string()))?;

        let message = body.into_result().map_err(|(code, description)| {
            let code = code.unwrap_or(status);
            if code == 401 {
                DeliveryError::AuthenticationFailed
            } else {
                DeliveryError::rejected(code, description)
            }
        })?;

        tracing::info!(
            chat_id = %chat_id,
            message_id = message.message_id,
            "Telegram message delivered"
        );
        Ok(DeliveryReceipt::new(chat_id, message.message_id))
    }
}

#[async_trait]
impl ReplySource for TelegramGateway {
    async fn next_batch(&self) -> Result<Vec<InboundReply>, ReplySourceError> {
        let offset = self.next_offset.load(Ordering::SeqCst);

        let response = self
            .client
            .post(self.config.method_url("getUpdates"))
            .json(&GetUpdatesRequest {
                offset,
                timeout: self.config.long_poll.as_secs(),
                allowed_updates: &["message"],
            })
            .send()
            .await
            .map_err(|e| ReplySourceError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body: ApiResponse<Vec<Update>> = response
            .json()
            .await
            .map_err(|e| ReplySourceError::InvalidResponse(e.to_string()))?;

        let updates = body
            .into_result()
            .map_err(|(code, description)| ReplySourceError::Rejected {
                status: code.unwrap_or(status),
                description,
            })?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.next_offset.store(last + 1, Ordering::SeqCst);
        }

        Ok(updates.into_iter().filter_map(Update::into_reply).collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<u16>,
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<T, (Option<u16>, String)> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err((
                self.error_code,
                self.description
                    .unwrap_or_else(|| "no description".to_string()),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    chat: Chat,
    from: Option<User>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
    first_name: String,
    last_name: Option<String>,
    username: Option<String>,
}

impl User {
    fn display_name(&self) -> Option<String> {
        let full = match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        };
        let full = full.trim().to_string();
        if full.is_empty() {
            self.username.clone()
        } else {
            Some(full)
        }
    }
}

impl Update {
    /// Text messages with a sender become replies; everything else is skipped.
    fn into_reply(self) -> Option<InboundReply> {
        let message = self.message?;
        let text = message.text?;
        let from = message.from?;
        Some(InboundReply {
            chat_id: ChatId::new(message.chat.id),
            responder_id: ResponderId::new(from.id),
            responder_name: from.display_name(),
            text,
        })
    }
}
