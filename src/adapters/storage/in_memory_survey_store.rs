//! In-memory survey store.
//!
//! All state sits behind one async mutex, which is also the boundary that
//! makes the chat registry check-and-claim atomic.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::foundation::{ChatId, DomainError, SurveyId};
use crate::domain::survey::{Response, Survey};
use crate::ports::SurveyStore;

use super::{apply_chat_claim, survey_not_found};

#[derive(Debug, Default)]
struct Inner {
    surveys: HashMap<SurveyId, Survey>,
    responses: HashMap<SurveyId, Vec<Response>>,
    active_by_chat: HashMap<ChatId, SurveyId>,
}

/// Process-local survey store.
#[derive(Debug, Default)]
pub struct InMemorySurveyStore {
    inner: Mutex<Inner>,
}

impl InMemorySurveyStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored surveys, in any status.
    pub async fn survey_count(&self) -> usize {
        self.inner.lock().await.surveys.len()
    }
}

#[async_trait]
impl SurveyStore for InMemorySurveyStore {
    async fn put(&self, survey: &Survey) -> Result<(), DomainError> {
        let mut inner = self.inner.lock().await;
        apply_chat_claim(&mut inner.active_by_chat, survey)?;
        inner.surveys.insert(*survey.id(), survey.clone());
        Ok(())
    }

    async fn get(&self, id: &SurveyId) -> Result<Option<Survey>, DomainError> {
        Ok(self.inner.lock().await.surveys.get(id).cloned())
    }

    async fn find_active_by_chat(&self, chat_id: ChatId) -> Result<Option<Survey>, DomainError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .active_by_chat
            .get(&chat_id)
            .and_then(|id| inner.surveys.get(id))
            .cloned())
    }

    async fn append_response(
        &self,
        survey_id: &SurveyId,
        response: &Response,
    ) -> Result<usize, DomainError> {
        let mut inner = self.inner.lock().await;
        if !inner.surveys.contains_key(survey_id) {
            return Err(survey_not_found(survey_id));
        }
        let responses = inner.responses.entry(*survey_id).or_default();
        responses.push(response.clone());
        Ok(responses.len())
    }

    async fn list_responses(&self, survey_id: &SurveyId) -> Result<Vec<Response>, DomainError> {
        Ok(self
            .inner
            .lock()
            .await
            .responses
            .get(survey_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn count_responses(&self, survey_id: &SurveyId) -> Result<usize, DomainError> {
        Ok(self
            .inner
            .lock()
            .await
            .responses
            .get(survey_id)
            .map_or(0, Vec::len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ErrorCode, ResponderId};
    use crate::domain::survey::SurveyRequest;

    fn survey(chat: i64) -> Survey {
        let request = SurveyRequest::new(ChatId::new(chat), "q?", 2).unwrap();
        Survey::new(SurveyId::new(), &request)
    }

    #[tokio::test]
    async fn put_then_get_returns_survey() {
        let store = InMemorySurveyStore::new();
        let s = survey(1);
        store.put(&s).await.unwrap();

        assert_eq!(store.get(s.id()).await.unwrap(), Some(s));
    }

    #[tokio::test]
    async fn get_unknown_returns_none() {
        let store = InMemorySurveyStore::new();
        assert_eq!(store.get(&SurveyId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn second_active_survey_for_chat_is_rejected() {
        let store = InMemorySurveyStore::new();
        store.put(&survey(1)).await.unwrap();

        let err = store.put(&survey(1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ChatBusy);
        assert_eq!(store.survey_count().await, 1);
    }

    #[tokio::test]
    async fn different_chats_are_independent() {
        let store = InMemorySurveyStore::new();
        store.put(&survey(1)).await.unwrap();
        store.put(&survey(2)).await.unwrap();
        assert_eq!(store.survey_count().await, 2);
    }

    #[tokio::test]
    async fn closing_survey_releases_chat() {
        let store = InMemorySurveyStore::new();
        let mut first = survey(1);
        store.put(&first).await.unwrap();

        first.cancel().unwrap();
        store.put(&first).await.unwrap();

        assert_eq!(store.find_active_by_chat(ChatId::new(1)).await.unwrap(), None);
        store.put(&survey(1)).await.unwrap();
    }

    #[tokio::test]
    async fn find_active_by_chat_returns_holder() {
        let store = InMemorySurveyStore::new();
        let s = survey(9);
        store.put(&s).await.unwrap();

        let found = store.find_active_by_chat(ChatId::new(9)).await.unwrap();
        assert_eq!(found.map(|f| *f.id()), Some(*s.id()));
    }

    #[tokio::test]
    async fn responses_list_in_insertion_order() {
        let store = InMemorySurveyStore::new();
        let s = survey(1);
        store.put(&s).await.unwrap();

        for (n, text) in ["a", "b", "c"].into_iter().enumerate() {
            let r = Response::new(*s.id(), ResponderId::new(1), None, text);
            assert_eq!(store.append_response(s.id(), &r).await.unwrap(), n + 1);
        }

        let texts: Vec<String> = store
            .list_responses(s.id())
            .await
            .unwrap()
            .iter()
            .map(|r| r.text().to_string())
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert_eq!(store.count_responses(s.id()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn append_to_unknown_survey_fails() {
        let store = InMemorySurveyStore::new();
        let id = SurveyId::new();
        let r = Response::new(id, ResponderId::new(1), None, "x");

        let err = store.append_response(&id, &r).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SurveyNotFound);
        assert_eq!(store.count_responses(&id).await.unwrap(), 0);
    }
}
