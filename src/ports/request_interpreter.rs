//! Request Interpreter Port - natural language to survey parameters.
//!
//! Implementations are best-effort (typically backed by a language model).
//! Their output is unvalidated; callers must convert it to a
//! `SurveyRequest` before creating anything.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::domain::survey::ExtractedRequest;

/// Port for turning a free-text ask into creation parameters.
#[async_trait]
pub trait RequestInterpreter: Send + Sync {
    /// Extract `{chat_id, question, expected_count}` from `free_text`.
    async fn extract(&self, free_text: &str) -> Result<ExtractedRequest, InterpretError>;
}

/// Interpreter failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpretError {
    /// The interpreter answered, but not in the expected shape.
    #[error("Malformed extraction: {0}")]
    Malformed(#[from] ValidationError),

    /// Credentials were refused.
    #[error("Interpreter authentication failed")]
    AuthenticationFailed,

    /// The backing service asked us to slow down.
    #[error("Interpreter rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// The backing service is down or returned an error.
    #[error("Interpreter unavailable: {0}")]
    Unavailable(String),

    /// Connection-level failure.
    #[error("Network error: {0}")]
    Network(String),
}

impl InterpretError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        InterpretError::Unavailable(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        InterpretError::Network(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            InterpretError::Malformed(_) => ErrorCode::InvalidParameter,
            _ => ErrorCode::InterpreterFailed,
        }
    }
}
