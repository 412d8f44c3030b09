//! ReplyRelay - feeds inbound chat replies into the survey lifecycle.
//!
//! Pulls batches from a [`ReplySource`] and records every reply against the
//! active survey of its chat. Replies in chats without an active survey are
//! ignored.
//!
//! ## Graceful Shutdown
//!
//! `run` stops when the shutdown channel carries `true` (or its sender is
//! dropped). A batch already fetched is always processed to the end.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::application::SurveyLifecycle;
use crate::domain::survey::SurveyError;
use crate::ports::{InboundReply, ReplySource, ReplySourceError};

/// Back-off settings for fetch failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRelayConfig {
    /// Delay after the first consecutive failure.
    pub initial_backoff: Duration,

    /// Upper bound for the doubled delay.
    pub max_backoff: Duration,
}

impl Default for ReplyRelayConfig {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl ReplyRelayConfig {
    /// Delay before the next fetch after `failures` consecutive failures.
    pub fn backoff(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1 << exponent)
            .min(self.max_backoff)
    }
}

/// What happened to one fetched batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayedBatch {
    pub received: usize,
    pub recorded: usize,
    /// Replies in chats without an active survey.
    pub unrouted: usize,
    /// Replies the lifecycle refused (survey closed, store failure).
    pub rejected: usize,
}

/// Relays replies until shutdown.
pub struct ReplyRelay {
    source: Arc<dyn ReplySource>,
    lifecycle: Arc<SurveyLifecycle>,
    config: ReplyRelayConfig,
}

impl ReplyRelay {
    pub fn new(source: Arc<dyn ReplySource>, lifecycle: Arc<SurveyLifecycle>) -> Self {
        Self::with_config(source, lifecycle, ReplyRelayConfig::default())
    }

    pub fn with_config(
        source: Arc<dyn ReplySource>,
        lifecycle: Arc<SurveyLifecycle>,
        config: ReplyRelayConfig,
    ) -> Self {
        Self {
            source,
            lifecycle,
            config,
        }
    }

    /// Run the relay loop until shutdown is signalled.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut failures: u32 = 0;

        loop {
            let fetched = tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => break,
                fetched = self.source.next_batch() => fetched,
            };

            match fetched {
                Ok(replies) => {
                    failures = 0;
                    self.relay(replies).await;
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    let delay = self.config.backoff(failures);
                    tracing::warn!(
                        error = %e,
                        failures,
                        retry_in_ms = delay.as_millis() as u64,
                        "Failed to fetch replies"
                    );
                    tokio::select! {
                        biased;
                        _ = shutdown_requested(&mut shutdown) => break,
                        _ = time::sleep(delay) => {}
                    }
                }
            }
        }

        tracing::info!("Reply relay stopped");
    }

    /// Fetch and relay a single batch.
    ///
    /// Useful for testing without running the full loop.
    pub async fn poll_once(&self) -> Result<RelayedBatch, ReplySourceError> {
        let replies = self.source.next_batch().await?;
        Ok(self.relay(replies).await)
    }

    async fn relay(&self, replies: Vec<InboundReply>) -> RelayedBatch {
        let mut batch = RelayedBatch {
            received: replies.len(),
            ..RelayedBatch::default()
        };

        for reply in replies {
            let outcome = self
                .lifecycle
                .record_chat_reply(
                    reply.chat_id,
                    reply.responder_id,
                    reply.responder_name,
                    &reply.text,
                )
                .await;

            match outcome {
                Ok(recorded) => {
                    batch.recorded += 1;
                    tracing::info!(
                        chat_id = %reply.chat_id,
                        responder_id = %reply.responder_id,
                        recorded = recorded.recorded,
                        status = %recorded.status,
                        "Reply recorded"
                    );
                }
                Err(SurveyError::NoActiveSurvey(chat_id)) => {
                    batch.unrouted += 1;
                    tracing::debug!(chat_id = %chat_id, "Ignoring reply outside a survey");
                }
                Err(e @ SurveyError::NotActive { .. }) => {
                    batch.rejected += 1;
                    tracing::debug!(chat_id = %reply.chat_id, error = %e, "Reply arrived after survey closed");
                }
                Err(e) => {
                    batch.rejected += 1;
                    tracing::warn!(chat_id = %reply.chat_id, error = %e, "Failed to record reply");
                }
            }
        }

        batch
    }
}

/// Resolves once shutdown is requested or the sender is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
