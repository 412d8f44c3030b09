//! Anthropic-backed request interpreter.
//!
//! Asks a Claude model to restate a free-text survey request in the
//! three-line `chatId:` / `question:` / `expectedCount:` format, then parses
//! that answer. Model output is treated as untrusted text.
//!
//! # Configuration
//!
//! ```ignore
//! let config = AnthropicConfig::new(api_key)
//!     .with_model("claude-sonnet-4-20250514");
//!
//! let interpreter = AnthropicInterpreter::new(config)?;
//! let raw = interpreter.extract("Ask 5 users in group -123 what they want for lunch").await?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::survey::{parse_extraction, ExtractedRequest};
use crate::ports::{InterpretError, RequestInterpreter};

/// Anthropic API version header value.
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

const EXTRACTION_INSTRUCTIONS: &str = "\
Parse this survey request and extract the parameters in this exact format:
chatId: <number>
question: <the question>
expectedCount: <number>

Examples:
- \"Ask user 8360446449 what their favourite colour is\"
  -> chatId: 8360446449
  -> question: What is your favourite colour?
  -> expectedCount: 1

- \"Ask 5 users in group -123456 what their favorite food is\"
  -> chatId: -123456
  -> question: What is your favorite food?
  -> expectedCount: 5

If the user mentions asking ONE person or ONE user, set expectedCount to 1.
If they mention a specific number, use that number.

Respond with ONLY the three lines in the format shown above, nothing else.";

/// Configuration for the Anthropic interpreter.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API (default: https://api.anthropic.com).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl AnthropicConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 2,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Request interpreter backed by the Anthropic messages API.
pub struct AnthropicInterpreter {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicInterpreter {
    pub fn new(config: AnthropicConfig) -> Result<Self, InterpretError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| InterpretError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }

    fn build_request(&self, free_text: &str) -> MessagesRequest {
        MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: 256,
            temperature: Some(0.0),
            system: EXTRACTION_INSTRUCTIONS.to_string(),
            messages: vec![ApiMessage {
                role: "user".to_string(),
                content: format!("User request: {}", free_text),
            }],
        }
    }

    async fn send_request(&self, free_text: &str) -> Result<Response, InterpretError> {
        self.client
            .post(self.messages_url())
            .header("x-api-key", self.config.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(&self.build_request(free_text))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InterpretError::network(format!(
                        "Request timed out after {}s",
                        self.config.timeout.as_secs()
                    ))
                } else {
                    InterpretError::network(e.to_string())
                }
            })
    }

    async fn read_text(&self, response: Response) -> Result<String, InterpretError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => InterpretError::AuthenticationFailed,
                429 => InterpretError::RateLimited {
                    retry_after_secs: 60,
                },
                _ => InterpretError::unavailable(format!("Status {}: {}", status, body)),
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| InterpretError::unavailable(format!("Failed to parse response: {}", e)))?;

        Ok(parsed
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join(""))
    }

    async fn complete(&self, free_text: &str) -> Result<String, InterpretError> {
        let mut retry_count = 0;
        loop {
            let result = match self.send_request(free_text).await {
                Ok(response) => self.read_text(response).await,
                Err(err) => Err(err),
            };

            match result {
                Ok(text) => return Ok(text),
                Err(err) if !is_retryable(&err) || retry_count >= self.config.max_retries => {
                    return Err(err)
                }
                Err(err) => {
                    tracing::warn!(attempt = retry_count + 1, error = %err, "Interpreter call failed, retrying");
                }
            }

            // Exponential backoff: 1s, 2s, 4s, ...
            sleep(Duration::from_secs(1 << retry_count)).await;
            retry_count += 1;
        }
    }
}

fn is_retryable(err: &InterpretError) -> bool {
    matches!(
        err,
        InterpretError::Network(_) | InterpretError::Unavailable(_)
    )
}

#[async_trait]
impl RequestInterpreter for AnthropicInterpreter {
    async fn extract(&self, free_text: &str) -> Result<ExtractedRequest, InterpretError> {
        let text = self.complete(free_text).await?;
        tracing::info!(extracted = %text.trim(), "Interpreter returned parameters");
        Ok(parse_extraction(&text)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    system: String,
    messages: Vec<ApiMessage>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}
