//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    InvalidParameter,

    // Not found errors
    SurveyNotFound,
    NoActiveSurvey,

    // State errors
    InvalidStateTransition,
    SurveyNotActive,
    SurveyNotComplete,
    ChatBusy,

    // Waiting
    Timeout,
    Cancelled,

    // External collaborators
    DeliveryFailed,
    InterpreterFailed,

    // Infrastructure errors
    StorageError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidParameter => "INVALID_PARAMETER",
            ErrorCode::SurveyNotFound => "SURVEY_NOT_FOUND",
            ErrorCode::NoActiveSurvey => "NO_ACTIVE_SURVEY",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::SurveyNotActive => "SURVEY_NOT_ACTIVE",
            ErrorCode::SurveyNotComplete => "SURVEY_NOT_COMPLETE",
            ErrorCode::ChatBusy => "CHAT_BUSY",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Cancelled => "CANCELLED",
            ErrorCode::DeliveryFailed => "DELIVERY_FAILED",
            ErrorCode::InterpreterFailed => "INTERPRETER_FAILED",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
///
/// Storage ports report failures with this type.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("question");
        assert_eq!(format!("{}", err), "Field 'question' cannot be empty");
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("expected_count", 1, 100, 0);
        assert_eq!(
            format!("{}", err),
            "Field 'expected_count' must be between 1 and 100, got 0"
        );
    }

    #[test]
    fn validation_error_reports_field_name() {
        let err = ValidationError::invalid_format("chat_id", "not a number");
        assert_eq!(err.field(), "chat_id");
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::SurveyNotFound, "Survey not found");
        assert_eq!(format!("{}", err), "[SURVEY_NOT_FOUND] Survey not found");
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::storage("disk full").with_detail("path", "/tmp/surveys");

        assert_eq!(err.code, ErrorCode::StorageError);
        assert_eq!(err.details.get("path"), Some(&"/tmp/surveys".to_string()));
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(format!("{}", ErrorCode::SurveyNotActive), "SURVEY_NOT_ACTIVE");
        assert_eq!(format!("{}", ErrorCode::Timeout), "TIMEOUT");
    }
}
