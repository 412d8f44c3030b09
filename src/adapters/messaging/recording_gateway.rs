//! Recording messaging gateway.
//!
//! Keeps every delivered message in memory instead of talking to a chat
//! platform. Used by tests and dry runs.
//!
//! # Features
//!
//! - Sent message capture for assertions
//! - Error injection (next N sends, or all sends to a chat)
//! - Simulated transport latency
//!
//! # Example
//!
//! ```ignore
//! let gateway = RecordingGateway::new().failing_next(1);
//!
//! assert!(gateway.send(chat, "first").await.is_err());
//! assert!(gateway.send(chat, "second").await.is_ok());
//! assert_eq!(gateway.sent_to(chat).len(), 1);
//! ```

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::domain::foundation::{ChatId, Timestamp};
use crate::ports::{DeliveryError, DeliveryReceipt, MessagingGateway};

/// A message captured by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub sent_at: Timestamp,
}

#[derive(Debug, Default)]
struct State {
    sent: Vec<SentMessage>,
    failures_remaining: usize,
    unreachable: HashSet<ChatId>,
    attempts: usize,
}

/// In-memory gateway that records outbound messages.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    state: Mutex<State>,
    next_message_id: AtomicI64,
    latency: Duration,
}

impl RecordingGateway {
    /// Creates a gateway that accepts every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `count` sends fail with a network error.
    pub fn failing_next(self, count: usize) -> Self {
        self.lock().failures_remaining = count;
        self
    }

    /// Every send takes `latency` before it succeeds or fails.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Every send to `chat_id` is rejected.
    pub fn with_unreachable_chat(self, chat_id: ChatId) -> Self {
        self.lock().unreachable.insert(chat_id);
        self
    }

    /// All successfully delivered messages, in send order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.lock().sent.clone()
    }

    /// Delivered messages for one chat.
    pub fn sent_to(&self, chat_id: ChatId) -> Vec<SentMessage> {
        self.lock()
            .sent
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect()
    }

    /// Number of send attempts, failed ones included.
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // state stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<DeliveryReceipt, DeliveryError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut state = self.lock();
        state.attempts += 1;

        if state.unreachable.contains(&chat_id) {
            return Err(DeliveryError::rejected(400, "Bad Request: chat not found"));
        }
        if state.failures_remaining > 0 {
            state.failures_remaining -= 1;
            return Err(DeliveryError::network("simulated network failure"));
        }

        state.sent.push(SentMessage {
            chat_id,
            text: text.to_string(),
            sent_at: Timestamp::now(),
        });
        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(DeliveryReceipt::new(chat_id, message_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_messages_in_order() {
        let gateway = RecordingGateway::new();
        gateway.send(ChatId::new(1), "a").await.unwrap();
        gateway.send(ChatId::new(2), "b").await.unwrap();

        let texts: Vec<String> = gateway.sent().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["a", "b"]);
        assert_eq!(gateway.sent_to(ChatId::new(2)).len(), 1);
    }

    #[tokio::test]
    async fn assigns_increasing_message_ids() {
        let gateway = RecordingGateway::new();
        let first = gateway.send(ChatId::new(1), "a").await.unwrap();
        let second = gateway.send(ChatId::new(1), "b").await.unwrap();
        assert!(second.message_id > first.message_id);
    }

    #[tokio::test]
    async fn failing_next_fails_then_recovers() {
        let gateway = RecordingGateway::new().failing_next(2);

        assert!(gateway.send(ChatId::new(1), "a").await.is_err());
        assert!(gateway.send(ChatId::new(1), "b").await.is_err());
        assert!(gateway.send(ChatId::new(1), "c").await.is_ok());
        assert_eq!(gateway.attempts(), 3);
        assert_eq!(gateway.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_delays_every_send() {
        let gateway = RecordingGateway::new()
            .with_latency(Duration::from_secs(3))
            .failing_next(1);
        let start = tokio::time::Instant::now();

        assert!(gateway.send(ChatId::new(1), "a").await.is_err());
        assert!(gateway.send(ChatId::new(1), "b").await.is_ok());
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test]
    async fn unreachable_chat_is_rejected() {
        let gateway = RecordingGateway::new().with_unreachable_chat(ChatId::new(9));

        let err = gateway.send(ChatId::new(9), "a").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Rejected { status: 400, .. }));
        assert!(gateway.send(ChatId::new(1), "b").await.is_ok());
    }
}
