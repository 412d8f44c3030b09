//! Survey-specific error types.

use thiserror::Error;

use crate::domain::foundation::{
    ChatId, DomainError, ErrorCode, SurveyId, SurveyStatus, ValidationError,
};
use crate::ports::DeliveryError;

/// Errors raised by survey lifecycle operations.
#[derive(Debug, Clone, Error)]
pub enum SurveyError {
    /// Creation input (or interpreter output) failed validation.
    #[error("Invalid parameter '{field}': {message}")]
    InvalidParameter { field: String, message: String },

    /// No survey with this identifier exists.
    #[error("Survey not found: {0}")]
    NotFound(SurveyId),

    /// A chat reply arrived but the chat has no active survey.
    #[error("No active survey in chat {0}")]
    NoActiveSurvey(ChatId),

    /// The survey no longer accepts responses.
    #[error("Survey {id} is not active (status: {status})")]
    NotActive { id: SurveyId, status: SurveyStatus },

    /// Results were requested before the survey completed.
    #[error("Survey {id} is not complete (status: {status})")]
    NotComplete { id: SurveyId, status: SurveyStatus },

    /// The chat already has an active survey.
    #[error("Chat {0} already has an active survey")]
    ChatBusy(ChatId),

    /// The initial broadcast could not be delivered.
    #[error("Failed to deliver survey to chat {chat_id}: {source}")]
    Delivery {
        chat_id: ChatId,
        #[source]
        source: DeliveryError,
    },

    /// The backing store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SurveyError {
    pub fn invalid_parameter(field: impl Into<String>, message: impl Into<String>) -> Self {
        SurveyError::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SurveyError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            SurveyError::NotFound(_) => ErrorCode::SurveyNotFound,
            SurveyError::NoActiveSurvey(_) => ErrorCode::NoActiveSurvey,
            SurveyError::NotActive { .. } => ErrorCode::SurveyNotActive,
            SurveyError::NotComplete { .. } => ErrorCode::SurveyNotComplete,
            SurveyError::ChatBusy(_) => ErrorCode::ChatBusy,
            SurveyError::Delivery { .. } => ErrorCode::DeliveryFailed,
            SurveyError::Storage(_) => ErrorCode::StorageError,
        }
    }
}

impl From<ValidationError> for SurveyError {
    fn from(err: ValidationError) -> Self {
        SurveyError::InvalidParameter {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for SurveyError {
    fn from(err: DomainError) -> Self {
        SurveyError::Storage(err.to_string())
    }
}
