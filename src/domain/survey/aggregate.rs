//! Survey aggregate entity.
//!
//! A survey is one question broadcast to one chat, waiting for a target
//! number of replies. Responses reference the survey by ID; the survey
//! does not own them.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ChatId, StateMachine, SurveyId, SurveyStatus, Timestamp,
};

use super::{SurveyError, SurveyRequest};

/// Survey aggregate.
///
/// # Invariants
///
/// - `expected_count >= 1` and `question` is non-empty (enforced by `SurveyRequest`)
/// - `status` only moves forward: `Active` to one terminal state
/// - `closed_at` is set exactly when `status` is terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    id: SurveyId,
    chat_id: ChatId,
    question: String,
    expected_count: u32,
    status: SurveyStatus,
    created_at: Timestamp,
    closed_at: Option<Timestamp>,
}

impl Survey {
    /// Create a new active survey from validated parameters.
    pub fn new(id: SurveyId, request: &SurveyRequest) -> Self {
        Self {
            id,
            chat_id: request.chat_id(),
            question: request.question().to_string(),
            expected_count: request.expected_count(),
            status: SurveyStatus::Active,
            created_at: Timestamp::now(),
            closed_at: None,
        }
    }

    /// Reconstitute a survey from persistence (no validation).
    pub fn reconstitute(
        id: SurveyId,
        chat_id: ChatId,
        question: String,
        expected_count: u32,
        status: SurveyStatus,
        created_at: Timestamp,
        closed_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            chat_id,
            question,
            expected_count,
            status,
            created_at,
            closed_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SurveyId {
        &self.id
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn expected_count(&self) -> u32 {
        self.expected_count
    }

    pub fn status(&self) -> SurveyStatus {
        self.status
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn closed_at(&self) -> Option<&Timestamp> {
        self.closed_at.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.status == SurveyStatus::Active
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Completion rule
    // ─────────────────────────────────────────────────────────────────────────

    /// True once `recorded` responses reach the target.
    pub fn is_satisfied_by(&self, recorded: usize) -> bool {
        recorded as u64 >= self.expected_count as u64
    }

    /// Responses still missing, never negative.
    pub fn remaining(&self, recorded: usize) -> u32 {
        let recorded = u32::try_from(recorded).unwrap_or(u32::MAX);
        self.expected_count.saturating_sub(recorded)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Fails unless the survey still accepts responses.
    pub fn ensure_accepts_responses(&self) -> Result<(), SurveyError> {
        if self.status.accepts_responses() {
            Ok(())
        } else {
            Err(SurveyError::NotActive {
                id: self.id,
                status: self.status,
            })
        }
    }

    /// Mark the survey completed.
    pub fn complete(&mut self) -> Result<(), SurveyError> {
        self.close(SurveyStatus::Completed)
    }

    /// Mark the survey timed out.
    pub fn time_out(&mut self) -> Result<(), SurveyError> {
        self.close(SurveyStatus::TimedOut)
    }

    /// Mark the survey cancelled.
    pub fn cancel(&mut self) -> Result<(), SurveyError> {
        self.close(SurveyStatus::Cancelled)
    }

    fn close(&mut self, target: SurveyStatus) -> Result<(), SurveyError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|_| SurveyError::NotActive {
                id: self.id,
                status: self.status,
            })?;
        self.closed_at = Some(Timestamp::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survey(expected: u32) -> Survey {
        let request = SurveyRequest::new(ChatId::new(42), "favorite color?", expected).unwrap();
        Survey::new(SurveyId::new(), &request)
    }

    #[test]
    fn new_survey_is_active_and_open() {
        let s = survey(2);
        assert_eq!(s.status(), SurveyStatus::Active);
        assert_eq!(s.chat_id(), ChatId::new(42));
        assert_eq!(s.question(), "favorite color?");
        assert!(s.closed_at().is_none());
    }

    #[test]
    fn satisfied_only_at_threshold() {
        let s = survey(3);
        assert!(!s.is_satisfied_by(0));
        assert!(!s.is_satisfied_by(2));
        assert!(s.is_satisfied_by(3));
        assert!(s.is_satisfied_by(4));
    }

    #[test]
    fn remaining_saturates_at_zero() {
        let s = survey(2);
        assert_eq!(s.remaining(0), 2);
        assert_eq!(s.remaining(1), 1);
        assert_eq!(s.remaining(5), 0);
    }

    #[test]
    fn complete_closes_survey() {
        let mut s = survey(1);
        s.complete().unwrap();
        assert_eq!(s.status(), SurveyStatus::Completed);
        assert!(s.closed_at().is_some());
    }

    #[test]
    fn terminal_survey_rejects_further_transitions() {
        let mut s = survey(1);
        s.time_out().unwrap();

        assert!(matches!(
            s.complete(),
            Err(SurveyError::NotActive {
                status: SurveyStatus::TimedOut,
                ..
            })
        ));
        assert!(s.cancel().is_err());
        assert_eq!(s.status(), SurveyStatus::TimedOut);
    }

    #[test]
    fn closed_survey_rejects_responses() {
        let mut s = survey(1);
        assert!(s.ensure_accepts_responses().is_ok());
        s.cancel().unwrap();
        assert!(s.ensure_accepts_responses().is_err());
    }

    #[test]
    fn survives_json_roundtrip() {
        let s = survey(4);
        let json = serde_json::to_string(&s).unwrap();
        let back: Survey = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
