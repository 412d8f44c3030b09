//! Queued reply source.
//!
//! Replies are pushed in by the caller and handed out in batches, which
//! lets tests and local runs feed the relay without a chat platform.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;

use crate::domain::foundation::{ChatId, ResponderId};
use crate::ports::{InboundReply, ReplySource, ReplySourceError};

/// In-memory [`ReplySource`].
///
/// `next_batch` returns every reply queued so far. With nothing queued it
/// waits up to the configured idle time (like a long poll) and then returns
/// an empty batch. A queued error is returned on its own, in order.
#[derive(Debug)]
pub struct QueuedReplySource {
    queue: Mutex<VecDeque<Result<InboundReply, ReplySourceError>>>,
    notify: Notify,
    idle_wait: Duration,
}

impl Default for QueuedReplySource {
    fn default() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            idle_wait: Duration::from_secs(1),
        }
    }
}

impl QueuedReplySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_wait(mut self, idle_wait: Duration) -> Self {
        self.idle_wait = idle_wait;
        self
    }

    /// Queue a reply.
    pub fn push(&self, reply: InboundReply) {
        self.lock().push_back(Ok(reply));
        self.notify.notify_one();
    }

    /// Queue a plain text reply from `responder_id`.
    pub fn push_text(&self, chat_id: ChatId, responder_id: i64, name: Option<&str>, text: &str) {
        self.push(InboundReply {
            chat_id,
            responder_id: ResponderId::new(responder_id),
            responder_name: name.map(str::to_string),
            text: text.to_string(),
        });
    }

    /// Queue a fetch failure.
    pub fn push_error(&self, err: ReplySourceError) {
        self.lock().push_back(Err(err));
        self.notify.notify_one();
    }

    /// Entries not yet handed out.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    fn take(&self) -> Option<Result<Vec<InboundReply>, ReplySourceError>> {
        let mut queue = self.lock();
        if let Some(Err(_)) = queue.front() {
            return queue.pop_front().map(|entry| entry.map(|reply| vec![reply]));
        }

        let mut batch = Vec::new();
        while let Some(Ok(_)) = queue.front() {
            if let Some(Ok(reply)) = queue.pop_front() {
                batch.push(reply);
            }
        }
        (!batch.is_empty()).then_some(Ok(batch))
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Result<InboundReply, ReplySourceError>>> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ReplySource for QueuedReplySource {
    async fn next_batch(&self) -> Result<Vec<InboundReply>, ReplySourceError> {
        if let Some(batch) = self.take() {
            return batch;
        }

        let _ = tokio::time::timeout(self.idle_wait, self.notify.notified()).await;
        self.take().unwrap_or(Ok(Vec::new()))
    }
}
