//! CompletionWaiter - waits for a survey to complete, nudging the chat.
//!
//! The waiter drives three timers against the same start instant:
//!
//! | Timer | Default | On fire |
//! |-------|---------|---------|
//! | deadline | 10 min | stop with `Timeout` (optionally marking the survey) |
//! | poll | 2 s | check the survey status, first check immediate |
//! | reminder | 5 min | send a reminder with the remaining count |
//!
//! When timers fire together the deadline wins over the poll and the poll
//! wins over the reminder. A reminder due exactly at the deadline is never
//! sent, and a reminder interval at or above the timeout sends none. A
//! reminder still being delivered when the deadline passes is abandoned.
//!
//! ## Cancellation
//!
//! [`CompletionWaiter::spawn`] returns a [`WaitHandle`]. Cancelling it (or
//! dropping it) stops the wait promptly. No further reminders are sent and
//! the survey itself is left untouched.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::application::SurveyLifecycle;
use crate::domain::foundation::{ErrorCode, SurveyId, SurveyStatus};
use crate::domain::survey::{reminder_text, SurveyError, SurveyResults};
use crate::ports::MessagingGateway;

/// Timer settings for a wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitSettings {
    /// Total time to wait for completion.
    pub timeout: Duration,

    /// Time between reminders.
    pub reminder_interval: Duration,

    /// Time between status checks.
    pub poll_interval: Duration,

    /// Move the survey to `TimedOut` when the deadline passes.
    pub mark_timed_out: bool,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            reminder_interval: Duration::from_secs(300),
            poll_interval: Duration::from_secs(2),
            mark_timed_out: true,
        }
    }
}

impl WaitSettings {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_reminder_interval(mut self, interval: Duration) -> Self {
        self.reminder_interval = interval;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_mark_timed_out(mut self, mark: bool) -> Self {
        self.mark_timed_out = mark;
        self
    }
}

/// Why a wait ended without results.
#[derive(Debug, Clone, Error)]
pub enum WaitError {
    /// The deadline passed before the survey completed.
    #[error("Survey {survey_id} did not complete within {}s", timeout.as_secs())]
    Timeout { survey_id: SurveyId, timeout: Duration },

    /// The wait was cancelled by its owner.
    #[error("Wait for survey {0} was cancelled")]
    Cancelled(SurveyId),

    /// The survey reached a terminal status other than `Completed`.
    #[error("Survey {survey_id} closed without completing (status: {status})")]
    Closed {
        survey_id: SurveyId,
        status: SurveyStatus,
    },

    /// The wait task panicked or was aborted.
    #[error("Wait task for survey {survey_id} failed: {message}")]
    Aborted { survey_id: SurveyId, message: String },

    /// A lifecycle query failed.
    #[error(transparent)]
    Lifecycle(#[from] SurveyError),
}

impl WaitError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            WaitError::Timeout { .. } => ErrorCode::Timeout,
            WaitError::Cancelled(_) => ErrorCode::Cancelled,
            WaitError::Closed { .. } => ErrorCode::SurveyNotActive,
            WaitError::Aborted { .. } => ErrorCode::InternalError,
            WaitError::Lifecycle(e) => e.code(),
        }
    }
}

/// Handle to a wait running on its own task.
#[derive(Debug)]
pub struct WaitHandle {
    survey_id: SurveyId,
    cancel: watch::Sender<bool>,
    task: JoinHandle<Result<SurveyResults, WaitError>>,
}

impl WaitHandle {
    pub fn survey_id(&self) -> &SurveyId {
        &self.survey_id
    }

    /// Ask the wait to stop. Idempotent.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the outcome.
    pub async fn join(self) -> Result<SurveyResults, WaitError> {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Err(WaitError::Cancelled(self.survey_id)),
            Err(e) => Err(WaitError::Aborted {
                survey_id: self.survey_id,
                message: e.to_string(),
            }),
        }
    }
}

/// Waits for surveys to complete.
#[derive(Clone)]
pub struct CompletionWaiter {
    lifecycle: Arc<SurveyLifecycle>,
    gateway: Arc<dyn MessagingGateway>,
    settings: WaitSettings,
}

impl CompletionWaiter {
    pub fn new(lifecycle: Arc<SurveyLifecycle>, gateway: Arc<dyn MessagingGateway>) -> Self {
        Self::with_settings(lifecycle, gateway, WaitSettings::default())
    }

    pub fn with_settings(
        lifecycle: Arc<SurveyLifecycle>,
        gateway: Arc<dyn MessagingGateway>,
        settings: WaitSettings,
    ) -> Self {
        Self {
            lifecycle,
            gateway,
            settings,
        }
    }

    pub fn settings(&self) -> &WaitSettings {
        &self.settings
    }

    /// Block until the survey completes or the timeout elapses.
    ///
    /// # Errors
    ///
    /// - `Timeout` if the deadline passes first
    /// - `Closed` if the survey is cancelled or timed out by someone else
    /// - `Lifecycle` if the survey is unknown or the store fails
    pub async fn await_completion(&self, survey_id: SurveyId) -> Result<SurveyResults, WaitError> {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        self.wait(survey_id, cancel_rx).await
    }

    /// Run the wait on a new task and return a cancellable handle.
    pub fn spawn(&self, survey_id: SurveyId) -> WaitHandle {
        let (cancel, cancel_rx) = watch::channel(false);
        let waiter = self.clone();
        let task = tokio::spawn(async move { waiter.wait(survey_id, cancel_rx).await });

        WaitHandle {
            survey_id,
            cancel,
            task,
        }
    }

    /// Wait until completion, timeout or a `true` on `cancel`.
    ///
    /// A dropped sender counts as cancellation.
    pub async fn wait(
        &self,
        survey_id: SurveyId,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<SurveyResults, WaitError> {
        let start = Instant::now();
        let reminder_every = non_zero(self.settings.reminder_interval);

        let deadline = time::sleep_until(start + self.settings.timeout);
        tokio::pin!(deadline);

        let mut poll = time::interval_at(start, non_zero(self.settings.poll_interval));
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut reminders = time::interval_at(start + reminder_every, reminder_every);
        reminders.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(
            survey_id = %survey_id,
            timeout_secs = self.settings.timeout.as_secs(),
            reminder_secs = reminder_every.as_secs(),
            "Waiting for survey completion"
        );

        loop {
            tokio::select! {
                biased;

                _ = cancel_requested(&mut cancel) => {
                    tracing::info!(survey_id = %survey_id, "Survey wait cancelled");
                    return Err(WaitError::Cancelled(survey_id));
                }

                _ = &mut deadline => {
                    return self.expire(survey_id).await;
                }

                _ = poll.tick() => {
                    let survey = self.lifecycle.get_status(&survey_id).await?;
                    match survey.status() {
                        SurveyStatus::Active => {}
                        SurveyStatus::Completed => {
                            return Ok(self.lifecycle.get_results(&survey_id).await?);
                        }
                        status => return Err(WaitError::Closed { survey_id, status }),
                    }
                }

                _ = reminders.tick() => {
                    // a slow send must not hold off the deadline or a cancel
                    tokio::select! {
                        biased;

                        _ = cancel_requested(&mut cancel) => {
                            tracing::info!(survey_id = %survey_id, "Survey wait cancelled during reminder");
                            return Err(WaitError::Cancelled(survey_id));
                        }

                        _ = &mut deadline => {
                            tracing::debug!(survey_id = %survey_id, "Reminder still in flight at deadline");
                            return self.expire(survey_id).await;
                        }

                        _ = self.send_reminder(&survey_id) => {}
                    }
                }
            }
        }
    }

    /// Deadline handling. A completion that landed after the last poll
    /// still counts, since it happened before the deadline.
    async fn expire(&self, survey_id: SurveyId) -> Result<SurveyResults, WaitError> {
        let survey = if self.settings.mark_timed_out {
            self.lifecycle.mark_timed_out(&survey_id).await?
        } else {
            self.lifecycle.get_status(&survey_id).await?
        };

        if survey.status() == SurveyStatus::Completed {
            return Ok(self.lifecycle.get_results(&survey_id).await?);
        }

        tracing::warn!(
            survey_id = %survey_id,
            status = %survey.status(),
            timeout_secs = self.settings.timeout.as_secs(),
            "Survey did not complete in time"
        );
        Err(WaitError::Timeout {
            survey_id,
            timeout: self.settings.timeout,
        })
    }

    /// Send one reminder. Failures are logged and never end the wait.
    async fn send_reminder(&self, survey_id: &SurveyId) {
        let survey = match self.lifecycle.get_status(survey_id).await {
            Ok(survey) if survey.is_active() => survey,
            Ok(_) => return,
            Err(e) => {
                tracing::warn!(survey_id = %survey_id, error = %e, "Skipping reminder");
                return;
            }
        };

        let recorded = match self.lifecycle.response_count(survey_id).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(survey_id = %survey_id, error = %e, "Skipping reminder");
                return;
            }
        };

        let remaining = survey.remaining(recorded);
        let text = reminder_text(survey.question(), remaining);
        match self.gateway.send(survey.chat_id(), &text).await {
            Ok(receipt) => tracing::info!(
                survey_id = %survey_id,
                chat_id = %survey.chat_id(),
                message_id = receipt.message_id,
                remaining,
                "Reminder sent"
            ),
            Err(e) => tracing::warn!(
                survey_id = %survey_id,
                chat_id = %survey.chat_id(),
                error = %e,
                "Failed to send reminder"
            ),
        }
    }
}

/// Resolves once the owner asks to stop or drops the sender.
async fn cancel_requested(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            return;
        }
    }
}

fn non_zero(interval: Duration) -> Duration {
    interval.max(Duration::from_millis(1))
}
