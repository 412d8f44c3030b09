//! Survey store adapters.
//!
//! - `InMemorySurveyStore` - process-local store, used by tests and one-shot runs
//! - `FileSurveyStore` - YAML files on disk, one directory per survey

mod file_survey_store;
mod in_memory_survey_store;

pub use file_survey_store::FileSurveyStore;
pub use in_memory_survey_store::InMemorySurveyStore;

use std::collections::HashMap;

use crate::domain::foundation::{ChatId, DomainError, ErrorCode, SurveyId};
use crate::domain::survey::Survey;

/// Updates the per-chat registry for a survey about to be stored.
///
/// Must be called under the same lock that guards the write itself.
fn apply_chat_claim(
    active_by_chat: &mut HashMap<ChatId, SurveyId>,
    survey: &Survey,
) -> Result<(), DomainError> {
    let chat_id = survey.chat_id();
    let holder = active_by_chat.get(&chat_id).copied();

    if survey.is_active() {
        match holder {
            Some(active) if active != *survey.id() => Err(DomainError::new(
                ErrorCode::ChatBusy,
                format!("Chat {} already has an active survey", chat_id),
            )
            .with_detail("active_survey_id", active.to_string())),
            _ => {
                active_by_chat.insert(chat_id, *survey.id());
                Ok(())
            }
        }
    } else {
        if holder == Some(*survey.id()) {
            active_by_chat.remove(&chat_id);
        }
        Ok(())
    }
}

fn survey_not_found(id: &SurveyId) -> DomainError {
    DomainError::new(ErrorCode::SurveyNotFound, format!("Survey not found: {}", id))
}
