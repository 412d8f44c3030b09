//! SurveyResults read projection.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChatId, SurveyId};

use super::{Response, Survey};

/// Question plus responses in arrival order, produced once a survey completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResults {
    pub survey_id: SurveyId,
    pub chat_id: ChatId,
    pub question: String,
    pub expected_count: u32,
    pub responses: Vec<Response>,
}

impl SurveyResults {
    /// Builds the projection.
    ///
    /// `responses` must be in store insertion order, which is arrival
    /// order. Receive timestamps are not consulted, so a wall clock that
    /// steps backwards cannot reorder them.
    pub fn project(survey: &Survey, responses: Vec<Response>) -> Self {
        Self {
            survey_id: *survey.id(),
            chat_id: survey.chat_id(),
            question: survey.question().to_string(),
            expected_count: survey.expected_count(),
            responses,
        }
    }

    /// Response texts in order.
    pub fn answers(&self) -> Vec<&str> {
        self.responses.iter().map(|r| r.text()).collect()
    }

    /// One `"<name>: <text>"` line per response.
    pub fn summary_lines(&self) -> Vec<String> {
        self.responses
            .iter()
            .map(|r| format!("{}: {}", r.display_name(), r.text()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ResponderId, ResponseId, Timestamp};
    use crate::domain::survey::SurveyRequest;

    fn survey() -> Survey {
        let request = SurveyRequest::new(ChatId::new(42), "favorite color?", 3).unwrap();
        Survey::new(SurveyId::new(), &request)
    }

    fn response_at(survey: &Survey, secs: i64, text: &str) -> Response {
        Response::reconstitute(
            ResponseId::new(),
            *survey.id(),
            ResponderId::new(1),
            None,
            text.to_string(),
            Timestamp::from_unix_secs(secs).unwrap(),
        )
    }

    #[test]
    fn keeps_insertion_order_on_equal_timestamps() {
        let s = survey();
        let responses = vec![
            response_at(&s, 100, "first"),
            response_at(&s, 100, "second"),
            response_at(&s, 100, "third"),
        ];

        let results = SurveyResults::project(&s, responses);
        assert_eq!(results.answers(), vec!["first", "second", "third"]);
    }

    #[test]
    fn clock_stepping_back_does_not_reorder() {
        let s = survey();
        let responses = vec![response_at(&s, 200, "first"), response_at(&s, 100, "second")];

        let results = SurveyResults::project(&s, responses);
        assert_eq!(results.answers(), vec!["first", "second"]);
    }

    #[test]
    fn carries_question_and_target() {
        let s = survey();
        let results = SurveyResults::project(&s, vec![]);
        assert_eq!(results.question, "favorite color?");
        assert_eq!(results.expected_count, 3);
        assert!(results.is_empty());
    }

    #[test]
    fn summary_lines_use_display_names() {
        let s = survey();
        let named = Response::new(*s.id(), ResponderId::new(2), Some("Ada".into()), "blue");
        let anonymous = Response::new(*s.id(), ResponderId::new(3), None, "red");

        let results = SurveyResults::project(&s, vec![named, anonymous]);
        assert_eq!(results.summary_lines(), vec!["Ada: blue", "User 3: red"]);
    }
}
