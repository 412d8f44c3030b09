//! Reply Source Port - inbound chat messages.
//!
//! Abstracts however replies reach the process (long polling, webhook
//! queue, ...). The relay pulls batches and hands each reply to the
//! survey lifecycle.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{ChatId, ResponderId};

/// One text message received in a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundReply {
    pub chat_id: ChatId,
    pub responder_id: ResponderId,
    pub responder_name: Option<String>,
    pub text: String,
}

/// Port for pulling inbound replies.
#[async_trait]
pub trait ReplySource: Send + Sync {
    /// Wait for and return the next batch of replies.
    ///
    /// An empty batch is a normal outcome (nothing arrived in time).
    async fn next_batch(&self) -> Result<Vec<InboundReply>, ReplySourceError>;
}

/// Failures while fetching replies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplySourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Source rejected request ({status}): {description}")]
    Rejected { status: u16, description: String },

    #[error("Invalid source response: {0}")]
    InvalidResponse(String),
}
