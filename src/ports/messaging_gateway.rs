//! Messaging Gateway Port - outbound text delivery to a chat.
//!
//! Used for the initial survey broadcast and for reminders. Failure to
//! deliver the broadcast aborts survey creation; failure to deliver a
//! reminder is logged and ignored by the waiter.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{ChatId, Timestamp};

/// Port for sending text to a chat.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Deliver `text` to `chat_id`.
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<DeliveryReceipt, DeliveryError>;
}

/// Proof of delivery returned by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub chat_id: ChatId,
    /// Transport-assigned message identifier.
    pub message_id: i64,
    pub sent_at: Timestamp,
}

impl DeliveryReceipt {
    pub fn new(chat_id: ChatId, message_id: i64) -> Self {
        Self {
            chat_id,
            message_id,
            sent_at: Timestamp::now(),
        }
    }
}

/// Transport failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The transport refused the message (unknown chat, bot blocked, ...).
    #[error("Delivery rejected ({status}): {description}")]
    Rejected { status: u16, description: String },

    /// Credentials were refused.
    #[error("Transport authentication failed")]
    AuthenticationFailed,

    /// Connection-level failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not finish in time.
    #[error("Delivery timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The transport answered with something unparsable.
    #[error("Invalid transport response: {0}")]
    InvalidResponse(String),
}

impl DeliveryError {
    pub fn rejected(status: u16, description: impl Into<String>) -> Self {
        DeliveryError::Rejected {
            status,
            description: description.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        DeliveryError::Network(message.into())
    }

    /// Returns true if retrying the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            DeliveryError::Network(_) | DeliveryError::Timeout { .. } => true,
            DeliveryError::Rejected { status, .. } => *status == 429 || *status >= 500,
            DeliveryError::AuthenticationFailed | DeliveryError::InvalidResponse(_) => false,
        }
    }
}
