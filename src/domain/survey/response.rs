//! Response entity: one recorded reply to a survey.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ResponderId, ResponseId, SurveyId, Timestamp};

/// A single reply. Immutable once created.
///
/// Several responses from the same responder are independent records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    id: ResponseId,
    survey_id: SurveyId,
    responder_id: ResponderId,
    responder_name: Option<String>,
    text: String,
    received_at: Timestamp,
}

impl Response {
    /// Create a response received now.
    pub fn new(
        survey_id: SurveyId,
        responder_id: ResponderId,
        responder_name: Option<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: ResponseId::new(),
            survey_id,
            responder_id,
            responder_name: responder_name.filter(|name| !name.trim().is_empty()),
            text: text.into(),
            received_at: Timestamp::now(),
        }
    }

    /// Reconstitute a response from persistence.
    pub fn reconstitute(
        id: ResponseId,
        survey_id: SurveyId,
        responder_id: ResponderId,
        responder_name: Option<String>,
        text: String,
        received_at: Timestamp,
    ) -> Self {
        Self {
            id,
            survey_id,
            responder_id,
            responder_name,
            text,
            received_at,
        }
    }

    pub fn id(&self) -> &ResponseId {
        &self.id
    }

    pub fn survey_id(&self) -> &SurveyId {
        &self.survey_id
    }

    pub fn responder_id(&self) -> ResponderId {
        self.responder_id
    }

    pub fn responder_name(&self) -> Option<&str> {
        self.responder_name.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn received_at(&self) -> &Timestamp {
        &self.received_at
    }

    /// Display name, falling back to `User <id>`.
    pub fn display_name(&self) -> String {
        match &self.responder_name {
            Some(name) => name.clone(),
            None => format!("User {}", self.responder_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_given_name() {
        let r = Response::new(SurveyId::new(), ResponderId::new(1), Some("Ada".into()), "blue");
        assert_eq!(r.display_name(), "Ada");
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let r = Response::new(SurveyId::new(), ResponderId::new(7), None, "red");
        assert_eq!(r.display_name(), "User 7");
    }

    #[test]
    fn blank_name_is_dropped() {
        let r = Response::new(SurveyId::new(), ResponderId::new(7), Some("  ".into()), "red");
        assert_eq!(r.responder_name(), None);
    }

    #[test]
    fn each_response_gets_its_own_id() {
        let survey_id = SurveyId::new();
        let a = Response::new(survey_id, ResponderId::new(1), None, "x");
        let b = Response::new(survey_id, ResponderId::new(1), None, "x");
        assert_ne!(a.id(), b.id());
    }
}
