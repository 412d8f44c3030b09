//! SurveyStatus enum for tracking the lifecycle of a survey.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle status of a survey.
///
/// `Active` is the only non-terminal state. A survey never returns to
/// `Active` once it has left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SurveyStatus {
    #[default]
    Active,
    Completed,
    TimedOut,
    Cancelled,
}

impl SurveyStatus {
    /// Returns true if the survey still accepts responses.
    pub fn accepts_responses(&self) -> bool {
        matches!(self, SurveyStatus::Active)
    }

    /// Returns true if results can be read.
    pub fn has_results(&self) -> bool {
        matches!(self, SurveyStatus::Completed)
    }
}

impl StateMachine for SurveyStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use SurveyStatus::*;
        match self {
            Active => vec![Completed, TimedOut, Cancelled],
            Completed | TimedOut | Cancelled => vec![],
        }
    }
}

impl fmt::Display for SurveyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SurveyStatus::Active => "Active",
            SurveyStatus::Completed => "Completed",
            SurveyStatus::TimedOut => "TimedOut",
            SurveyStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}
