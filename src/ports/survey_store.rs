//! Survey store port.
//!
//! Durable keyed storage for surveys and their responses. The store holds
//! no business rules apart from the per-chat registry that guarantees at
//! most one active survey per chat.
//!
//! # Design
//!
//! - **Registry inside the store**: `put` claims and releases the chat
//!   atomically, so concurrent creates for one chat cannot both succeed
//! - **Append-only responses**: responses are listed in insertion order

use async_trait::async_trait;

use crate::domain::foundation::{ChatId, DomainError, SurveyId};
use crate::domain::survey::{Response, Survey};

/// Repository port for surveys and responses.
#[async_trait]
pub trait SurveyStore: Send + Sync {
    /// Insert or replace a survey.
    ///
    /// An active survey claims its chat; a survey in any other status
    /// releases the claim it holds.
    ///
    /// # Errors
    ///
    /// - `ChatBusy` if the survey is active and a different survey already
    ///   holds the chat
    /// - `StorageError` on persistence failure
    async fn put(&self, survey: &Survey) -> Result<(), DomainError>;

    /// Find a survey by its ID.
    ///
    /// Returns `None` if not found.
    async fn get(&self, id: &SurveyId) -> Result<Option<Survey>, DomainError>;

    /// Find the survey currently holding the chat, if any.
    async fn find_active_by_chat(&self, chat_id: ChatId) -> Result<Option<Survey>, DomainError>;

    /// Append a response to a survey.
    ///
    /// Returns the number of responses stored for the survey, this one
    /// included.
    ///
    /// # Errors
    ///
    /// - `SurveyNotFound` if the survey doesn't exist
    /// - `StorageError` on persistence failure
    async fn append_response(
        &self,
        survey_id: &SurveyId,
        response: &Response,
    ) -> Result<usize, DomainError>;

    /// List responses in insertion order.
    async fn list_responses(&self, survey_id: &SurveyId) -> Result<Vec<Response>, DomainError>;

    /// Count responses recorded for a survey.
    async fn count_responses(&self, survey_id: &SurveyId) -> Result<usize, DomainError>;
}
