//! Survey creation parameters and interpreter output parsing.
//!
//! Interpreter output is never trusted: [`ExtractedRequest`] carries the raw
//! values and only [`SurveyRequest`] is accepted by the lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ChatId, ValidationError};

/// Maximum question length accepted for a broadcast.
pub const MAX_QUESTION_LENGTH: usize = 4_000;

/// Validated parameters for creating a survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRequest {
    chat_id: ChatId,
    question: String,
    expected_count: u32,
}

impl SurveyRequest {
    /// Validates and builds creation parameters.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the question is blank
    /// - `OutOfRange` if the question is too long or `expected_count` is zero
    pub fn new(
        chat_id: ChatId,
        question: impl Into<String>,
        expected_count: u32,
    ) -> Result<Self, ValidationError> {
        let question = question.into().trim().to_string();
        if question.is_empty() {
            return Err(ValidationError::empty_field("question"));
        }
        let length = question.chars().count();
        if length > MAX_QUESTION_LENGTH {
            return Err(ValidationError::out_of_range(
                "question",
                1,
                MAX_QUESTION_LENGTH as i64,
                length as i64,
            ));
        }
        if expected_count < 1 {
            return Err(ValidationError::out_of_range(
                "expected_count",
                1,
                u32::MAX as i64,
                expected_count as i64,
            ));
        }

        Ok(Self {
            chat_id,
            question,
            expected_count,
        })
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
}

/// Unvalidated parameters as produced by a request interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRequest {
    pub chat_id: i64,
    pub question: String,
    pub expected_count: i64,
}

impl TryFrom<ExtractedRequest> for SurveyRequest {
    type Error = ValidationError;

    fn try_from(raw: ExtractedRequest) -> Result<Self, Self::Error> {
        let expected_count = u32::try_from(raw.expected_count).map_err(|_| {
            ValidationError::out_of_range("expected_count", 1, u32::MAX as i64, raw.expected_count)
        })?;
        SurveyRequest::new(ChatId::new(raw.chat_id), raw.question, expected_count)
    }
}

/// Parses the three-line `chatId:` / `question:` / `expectedCount:` format.
///
/// Lines may come in any order and unrelated lines are ignored. The first
/// occurrence of each key wins.
pub fn parse_extraction(text: &str) -> Result<ExtractedRequest, ValidationError> {
    let chat_id = find_value(text, "chatId")
        .ok_or_else(|| missing("chat_id", text))?
        .parse::<i64>()
        .map_err(|e| ValidationError::invalid_format("chat_id", e.to_string()))?;

    let question = find_value(text, "question")
        .ok_or_else(|| missing("question", text))?
        .to_string();

    let expected_count = find_value(text, "expectedCount")
        .ok_or_else(|| missing("expected_count", text))?
        .parse::<i64>()
        .map_err(|e| ValidationError::invalid_format("expected_count", e.to_string()))?;

    Ok(ExtractedRequest {
        chat_id,
        question,
        expected_count,
    })
}

fn find_value<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    text.lines().find_map(|line| {
        let line = line.trim().trim_start_matches(['-', '→', '*']).trim();
        let rest = line.strip_prefix(key)?;
        let value = rest.trim_start().strip_prefix(':')?;
        Some(value.trim())
    })
}

fn missing(field: &str, text: &str) -> ValidationError {
    ValidationError::invalid_format(field, format!("could not extract {} from: {}", field, text.trim()))
}
