//! Survey timing configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::WaitSettings;

/// Timers used while waiting for a survey to complete
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SurveyConfig {
    /// Total wait before a survey times out
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Time between reminder messages
    #[serde(default = "default_reminder_interval_secs")]
    pub reminder_interval_secs: u64,

    /// Time between completion checks, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Mark surveys as timed out when the wait expires
    #[serde(default = "default_mark_timed_out")]
    pub mark_timed_out: bool,
}

impl SurveyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Waiter settings built from this section
    pub fn wait_settings(&self) -> WaitSettings {
        WaitSettings::default()
            .with_timeout(self.timeout())
            .with_reminder_interval(self.reminder_interval())
            .with_poll_interval(self.poll_interval())
            .with_mark_timed_out(self.mark_timed_out)
    }

    /// Validate survey timing
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::ZeroDuration("survey.timeout_secs"));
        }
        if self.reminder_interval_secs == 0 {
            return Err(ValidationError::ZeroDuration("survey.reminder_interval_secs"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ValidationError::ZeroDuration("survey.poll_interval_ms"));
        }
        if self.poll_interval() >= self.reminder_interval() {
            return Err(ValidationError::PollSlowerThanReminders);
        }
        Ok(())
    }
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            reminder_interval_secs: default_reminder_interval_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            mark_timed_out: default_mark_timed_out(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    600
}

fn default_reminder_interval_secs() -> u64 {
    300
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_mark_timed_out() -> bool {
    true
}
