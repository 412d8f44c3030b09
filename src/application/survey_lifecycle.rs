//! SurveyLifecycle - owns survey state and its create/record/query operations.
//!
//! Every write to a survey (recording a response, timing out, cancelling)
//! runs under that survey's async mutex, so the read-append-count-complete
//! sequence is atomic with respect to other writers. Reads go straight to
//! the store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

use crate::domain::foundation::{ChatId, DomainError, ErrorCode, ResponderId, SurveyId, SurveyStatus};
use crate::domain::survey::{
    broadcast_text, Response, Survey, SurveyError, SurveyRequest, SurveyResults,
};
use crate::ports::{MessagingGateway, SurveyStore};

/// Outcome of a successfully recorded response.
#[derive(Debug, Clone)]
pub struct RecordedResponse {
    pub response: Response,
    /// Survey status after the response was counted.
    pub status: SurveyStatus,
    /// Responses recorded so far, this one included.
    pub recorded: usize,
}

impl RecordedResponse {
    /// True if this response completed the survey.
    pub fn completed_survey(&self) -> bool {
        self.status == SurveyStatus::Completed
    }
}

/// Keyed lock registry: one async mutex per survey.
#[derive(Debug, Default)]
struct SurveyLocks {
    locks: Mutex<HashMap<SurveyId, Arc<tokio::sync::Mutex<()>>>>,
}

impl SurveyLocks {
    async fn acquire(&self, id: &SurveyId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
            locks.entry(*id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drops the lock entry of a survey that reached a terminal status.
    ///
    /// Terminal surveys reject every write, so late arrivals that build a
    /// fresh mutex cannot violate the completion rule.
    fn release(&self, id: &SurveyId) {
        self.locks
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(id);
    }
}

/// Survey lifecycle service.
pub struct SurveyLifecycle {
    store: Arc<dyn SurveyStore>,
    gateway: Arc<dyn MessagingGateway>,
    locks: SurveyLocks,
}

impl SurveyLifecycle {
    pub fn new(store: Arc<dyn SurveyStore>, gateway: Arc<dyn MessagingGateway>) -> Self {
        Self {
            store,
            gateway,
            locks: SurveyLocks::default(),
        }
    }

    /// Create a survey and broadcast its question to the chat.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if `question` is empty or `expected_count < 1`
    /// - `ChatBusy` if the chat already has an active survey
    /// - `Delivery` if the broadcast fails (the survey is cancelled)
    pub async fn create(
        &self,
        chat_id: ChatId,
        question: &str,
        expected_count: u32,
    ) -> Result<Survey, SurveyError> {
        let request = SurveyRequest::new(chat_id, question, expected_count)?;
        self.create_from(&request).await
    }

    /// Create a survey from already validated parameters.
    pub async fn create_from(&self, request: &SurveyRequest) -> Result<Survey, SurveyError> {
        let survey = Survey::new(SurveyId::new(), request);

        self.store
            .put(&survey)
            .await
            .map_err(|e| map_store_error(e, survey.chat_id()))?;

        tracing::info!(
            survey_id = %survey.id(),
            chat_id = %survey.chat_id(),
            expected_count = survey.expected_count(),
            "Survey created"
        );

        let text = broadcast_text(survey.question(), survey.expected_count());
        if let Err(source) = self.gateway.send(survey.chat_id(), &text).await {
            tracing::error!(
                survey_id = %survey.id(),
                chat_id = %survey.chat_id(),
                error = %source,
                "Survey broadcast failed"
            );
            self.abandon_undelivered(survey.id()).await;
            return Err(SurveyError::Delivery {
                chat_id: survey.chat_id(),
                source,
            });
        }

        Ok(survey)
    }

    /// Cancel a survey whose broadcast failed, unless replies already
    /// closed it while the send was in flight.
    async fn abandon_undelivered(&self, survey_id: &SurveyId) {
        let _guard = self.locks.acquire(survey_id).await;

        let mut survey = match self.load(survey_id).await {
            Ok(survey) => survey,
            Err(e) => {
                tracing::error!(survey_id = %survey_id, error = %e, "Failed to reload undelivered survey");
                return;
            }
        };
        if !survey.is_active() {
            tracing::warn!(
                survey_id = %survey_id,
                status = %survey.status(),
                "Undelivered survey already closed, leaving it as is"
            );
            self.locks.release(survey_id);
            return;
        }

        if let Err(e) = survey.cancel() {
            tracing::error!(survey_id = %survey_id, error = %e, "Failed to cancel undelivered survey");
            return;
        }
        match self.store.put(&survey).await {
            Ok(()) => self.locks.release(survey_id),
            Err(e) => {
                tracing::error!(survey_id = %survey_id, error = %e, "Failed to cancel undelivered survey")
            }
        }
    }

    /// Append a response to an active survey, completing it on the threshold.
    ///
    /// Once the response is stored the call succeeds. If saving the
    /// completion fails the survey stays active and the next response
    /// completes it without being appended.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the survey is unknown
    /// - `NotActive` if the survey is completed, timed out or cancelled
    pub async fn record_response(
        &self,
        survey_id: &SurveyId,
        responder_id: ResponderId,
        responder_name: Option<String>,
        text: &str,
    ) -> Result<RecordedResponse, SurveyError> {
        let _guard = self.locks.acquire(survey_id).await;

        let mut survey = self.load(survey_id).await?;
        survey.ensure_accepts_responses()?;

        let stored = self.store.count_responses(survey_id).await?;
        if survey.is_satisfied_by(stored) {
            survey = self.complete(survey, stored).await?;
            return Err(SurveyError::NotActive {
                id: *survey_id,
                status: survey.status(),
            });
        }

        let response = Response::new(*survey_id, responder_id, responder_name, text);
        let recorded = self.store.append_response(survey_id, &response).await?;

        tracing::debug!(
            survey_id = %survey_id,
            responder_id = %responder_id,
            recorded,
            expected = survey.expected_count(),
            "Response recorded"
        );

        if survey.is_satisfied_by(recorded) {
            match self.complete(survey.clone(), recorded).await {
                Ok(completed) => survey = completed,
                Err(e) => tracing::error!(
                    survey_id = %survey_id,
                    recorded,
                    error = %e,
                    "Response recorded but completion was not saved"
                ),
            }
        }

        Ok(RecordedResponse {
            response,
            status: survey.status(),
            recorded,
        })
    }

    /// Persist the completion of a survey that reached its target.
    /// Callers hold the survey lock.
    async fn complete(&self, mut survey: Survey, recorded: usize) -> Result<Survey, SurveyError> {
        survey.complete()?;
        self.store
            .put(&survey)
            .await
            .map_err(|e| map_store_error(e, survey.chat_id()))?;
        self.locks.release(survey.id());
        tracing::info!(survey_id = %survey.id(), recorded, "Survey completed");
        Ok(survey)
    }

    /// Route a chat message to the chat's active survey.
    ///
    /// # Errors
    ///
    /// - `NoActiveSurvey` if the chat has no active survey
    /// - otherwise as [`record_response`](Self::record_response)
    pub async fn record_chat_reply(
        &self,
        chat_id: ChatId,
        responder_id: ResponderId,
        responder_name: Option<String>,
        text: &str,
    ) -> Result<RecordedResponse, SurveyError> {
        let survey = self
            .store
            .find_active_by_chat(chat_id)
            .await?
            .ok_or(SurveyError::NoActiveSurvey(chat_id))?;

        self.record_response(survey.id(), responder_id, responder_name, text)
            .await
    }

    /// The survey currently open in a chat, if any.
    pub async fn active_survey(&self, chat_id: ChatId) -> Result<Option<Survey>, SurveyError> {
        Ok(self.store.find_active_by_chat(chat_id).await?)
    }

    /// Current survey record.
    pub async fn get_status(&self, survey_id: &SurveyId) -> Result<Survey, SurveyError> {
        self.load(survey_id).await
    }

    /// Results projection of a completed survey.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the survey is unknown
    /// - `NotComplete` unless the survey is completed
    pub async fn get_results(&self, survey_id: &SurveyId) -> Result<SurveyResults, SurveyError> {
        let survey = self.load(survey_id).await?;
        if !survey.status().has_results() {
            return Err(SurveyError::NotComplete {
                id: *survey_id,
                status: survey.status(),
            });
        }

        let responses = self.store.list_responses(survey_id).await?;
        Ok(SurveyResults::project(&survey, responses))
    }

    /// Number of responses recorded so far.
    pub async fn response_count(&self, survey_id: &SurveyId) -> Result<usize, SurveyError> {
        self.load(survey_id).await?;
        Ok(self.store.count_responses(survey_id).await?)
    }

    /// Move an active survey to `TimedOut` so late replies are rejected.
    ///
    /// A survey that already reached a terminal status is returned as is.
    pub async fn mark_timed_out(&self, survey_id: &SurveyId) -> Result<Survey, SurveyError> {
        let _guard = self.locks.acquire(survey_id).await;

        let mut survey = self.load(survey_id).await?;
        if survey.is_active() {
            survey.time_out()?;
            self.store
                .put(&survey)
                .await
                .map_err(|e| map_store_error(e, survey.chat_id()))?;
            self.locks.release(survey_id);
            tracing::info!(survey_id = %survey_id, "Survey timed out");
        }
        Ok(survey)
    }

    /// Cancel an active survey.
    ///
    /// # Errors
    ///
    /// - `NotActive` if the survey already reached a terminal status
    pub async fn cancel(&self, survey_id: &SurveyId) -> Result<Survey, SurveyError> {
        let _guard = self.locks.acquire(survey_id).await;

        let mut survey = self.load(survey_id).await?;
        survey.cancel()?;
        self.store
            .put(&survey)
            .await
            .map_err(|e| map_store_error(e, survey.chat_id()))?;
        self.locks.release(survey_id);
        tracing::info!(survey_id = %survey_id, "Survey cancelled");
        Ok(survey)
    }

    async fn load(&self, survey_id: &SurveyId) -> Result<Survey, SurveyError> {
        self.store
            .get(survey_id)
            .await?
            .ok_or(SurveyError::NotFound(*survey_id))
    }
}

fn map_store_error(err: DomainError, chat_id: ChatId) -> SurveyError {
    match err.code {
        ErrorCode::ChatBusy => SurveyError::ChatBusy(chat_id),
        _ => SurveyError::from(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemorySurveyStore, RecordingGateway};
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory store whose next `n` saves of a completed survey fail.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemorySurveyStore,
        completion_failures: AtomicUsize,
    }

    impl FlakyStore {
        fn failing_completions(n: usize) -> Self {
            Self {
                completion_failures: AtomicUsize::new(n),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl SurveyStore for FlakyStore {
        async fn put(&self, survey: &Survey) -> Result<(), DomainError> {
            if survey.status() == SurveyStatus::Completed
                && self
                    .completion_failures
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
            {
                return Err(DomainError::storage("disk full"));
            }
            self.inner.put(survey).await
        }

        async fn get(&self, id: &SurveyId) -> Result<Option<Survey>, DomainError> {
            self.inner.get(id).await
        }

        async fn find_active_by_chat(&self, chat_id: ChatId) -> Result<Option<Survey>, DomainError> {
            self.inner.find_active_by_chat(chat_id).await
        }

        async fn append_response(
            &self,
            survey_id: &SurveyId,
            response: &Response,
        ) -> Result<usize, DomainError> {
            self.inner.append_response(survey_id, response).await
        }

        async fn list_responses(&self, survey_id: &SurveyId) -> Result<Vec<Response>, DomainError> {
            self.inner.list_responses(survey_id).await
        }

        async fn count_responses(&self, survey_id: &SurveyId) -> Result<usize, DomainError> {
            self.inner.count_responses(survey_id).await
        }
    }

    struct Fixture {
        store: Arc<InMemorySurveyStore>,
        gateway: Arc<RecordingGateway>,
        lifecycle: SurveyLifecycle,
    }

    fn fixture_with(gateway: RecordingGateway) -> Fixture {
        let store = Arc::new(InMemorySurveyStore::new());
        let gateway = Arc::new(gateway);
        let lifecycle = SurveyLifecycle::new(store.clone(), gateway.clone());
        Fixture {
            store,
            gateway,
            lifecycle,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingGateway::new())
    }

    fn chat() -> ChatId {
        ChatId::new(42)
    }

    #[tokio::test]
    async fn create_persists_active_survey_and_broadcasts() {
        let f = fixture();
        let survey = f.lifecycle.create(chat(), "favorite color?", 2).await.unwrap();

        assert_eq!(survey.status(), SurveyStatus::Active);
        assert_eq!(f.store.get(survey.id()).await.unwrap(), Some(survey.clone()));

        let sent = f.gateway.sent_to(chat());
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("Question: favorite color?"));
        assert!(sent[0].text.contains("after 2 responses"));
    }

    #[tokio::test]
    async fn create_rejects_zero_expected_count() {
        let f = fixture();
        let err = f.lifecycle.create(chat(), "q?", 0).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidParameter);
        assert_eq!(f.store.survey_count().await, 0);
        assert!(f.gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_empty_question() {
        let f = fixture();
        let err = f.lifecycle.create(chat(), "", 1).await.unwrap_err();
        assert!(matches!(err, SurveyError::InvalidParameter { ref field, .. } if field == "question"));
    }

    #[tokio::test]
    async fn create_rejects_second_active_survey_in_chat() {
        let f = fixture();
        f.lifecycle.create(chat(), "first?", 1).await.unwrap();

        let err = f.lifecycle.create(chat(), "second?", 1).await.unwrap_err();
        assert!(matches!(err, SurveyError::ChatBusy(c) if c == chat()));
        assert_eq!(f.gateway.sent().len(), 1);
    }

    #[tokio::test]
    async fn failed_broadcast_cancels_survey_and_frees_chat() {
        let f = fixture_with(RecordingGateway::new().failing_next(1));

        let err = f.lifecycle.create(chat(), "q?", 1).await.unwrap_err();
        assert!(matches!(err, SurveyError::Delivery { .. }));
        assert_eq!(err.code(), ErrorCode::DeliveryFailed);

        assert_eq!(f.store.find_active_by_chat(chat()).await.unwrap(), None);
        f.lifecycle.create(chat(), "retry?", 1).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn reply_during_failed_broadcast_keeps_completed_survey() {
        let gateway = RecordingGateway::new()
            .with_latency(Duration::from_secs(5))
            .failing_next(1);
        let lifecycle = Arc::new(fixture_with(gateway).lifecycle);

        let create = tokio::spawn({
            let lifecycle = lifecycle.clone();
            async move { lifecycle.create(chat(), "q?", 1).await }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;

        let recorded = lifecycle
            .record_chat_reply(chat(), ResponderId::new(1), None, "quick")
            .await
            .unwrap();
        assert!(recorded.completed_survey());

        let err = create.await.unwrap().unwrap_err();
        assert_eq!(err.code(), ErrorCode::DeliveryFailed);

        let id = *recorded.response.survey_id();
        let survey = lifecycle.get_status(&id).await.unwrap();
        assert_eq!(survey.status(), SurveyStatus::Completed);
        assert_eq!(lifecycle.get_results(&id).await.unwrap().answers(), vec!["quick"]);
    }

    #[tokio::test]
    async fn unsaved_completion_still_reports_recorded_response() {
        let store = Arc::new(FlakyStore::failing_completions(1));
        let lifecycle = SurveyLifecycle::new(store, Arc::new(RecordingGateway::new()));
        let id = *lifecycle.create(chat(), "q?", 1).await.unwrap().id();

        let recorded = lifecycle
            .record_response(&id, ResponderId::new(1), None, "yes")
            .await
            .unwrap();
        assert_eq!(recorded.recorded, 1);
        assert_eq!(recorded.status, SurveyStatus::Active);

        // the next reply finishes the completion instead of being appended
        let err = lifecycle
            .record_response(&id, ResponderId::new(2), None, "extra")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SurveyError::NotActive {
                status: SurveyStatus::Completed,
                ..
            }
        ));
        assert_eq!(lifecycle.get_results(&id).await.unwrap().answers(), vec!["yes"]);
        assert_eq!(lifecycle.active_survey(chat()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn active_survey_follows_chat_claim() {
        let f = fixture();
        assert_eq!(f.lifecycle.active_survey(chat()).await.unwrap(), None);

        let survey = f.lifecycle.create(chat(), "q?", 1).await.unwrap();
        assert_eq!(f.lifecycle.active_survey(chat()).await.unwrap(), Some(survey.clone()));
        assert_eq!(f.lifecycle.active_survey(ChatId::new(7)).await.unwrap(), None);

        f.lifecycle
            .record_response(survey.id(), ResponderId::new(1), None, "done")
            .await
            .unwrap();
        assert_eq!(f.lifecycle.active_survey(chat()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn favorite_color_scenario() {
        let f = fixture();
        let survey = f.lifecycle.create(chat(), "favorite color?", 2).await.unwrap();
        let id = *survey.id();

        let first = f
            .lifecycle
            .record_response(&id, ResponderId::new(1), None, "blue")
            .await
            .unwrap();
        assert!(!first.completed_survey());
        assert_eq!(f.lifecycle.get_status(&id).await.unwrap().status(), SurveyStatus::Active);

        let second = f
            .lifecycle
            .record_response(&id, ResponderId::new(2), None, "red")
            .await
            .unwrap();
        assert!(second.completed_survey());
        assert_eq!(second.recorded, 2);

        let results = f.lifecycle.get_results(&id).await.unwrap();
        assert_eq!(results.question, "favorite color?");
        assert_eq!(results.answers(), vec!["blue", "red"]);
    }

    #[tokio::test]
    async fn completed_survey_rejects_and_never_appends() {
        let f = fixture();
        let id = *f.lifecycle.create(chat(), "q?", 1).await.unwrap().id();
        f.lifecycle
            .record_response(&id, ResponderId::new(1), None, "yes")
            .await
            .unwrap();

        let err = f
            .lifecycle
            .record_response(&id, ResponderId::new(2), None, "late")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SurveyError::NotActive {
                status: SurveyStatus::Completed,
                ..
            }
        ));
        assert_eq!(f.lifecycle.response_count(&id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_survey_is_not_found() {
        let f = fixture();
        let id = SurveyId::new();

        let err = f
            .lifecycle
            .record_response(&id, ResponderId::new(1), None, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, SurveyError::NotFound(found) if found == id));
        assert!(matches!(f.lifecycle.get_status(&id).await, Err(SurveyError::NotFound(_))));
        assert!(matches!(f.lifecycle.response_count(&id).await, Err(SurveyError::NotFound(_))));
    }

    #[tokio::test]
    async fn results_before_completion_fail() {
        let f = fixture();
        let id = *f.lifecycle.create(chat(), "q?", 2).await.unwrap().id();

        let err = f.lifecycle.get_results(&id).await.unwrap_err();
        assert!(matches!(
            err,
            SurveyError::NotComplete {
                status: SurveyStatus::Active,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn duplicate_responders_count_additively() {
        let f = fixture();
        let id = *f.lifecycle.create(chat(), "q?", 3).await.unwrap().id();

        for text in ["r1", "r2", "r3"] {
            f.lifecycle
                .record_response(&id, ResponderId::new(1), Some("Ada".into()), text)
                .await
                .unwrap();
        }

        let results = f.lifecycle.get_results(&id).await.unwrap();
        assert_eq!(results.answers(), vec!["r1", "r2", "r3"]);
    }

    #[tokio::test]
    async fn chat_reply_routes_to_active_survey() {
        let f = fixture();
        let id = *f.lifecycle.create(chat(), "q?", 1).await.unwrap().id();

        let recorded = f
            .lifecycle
            .record_chat_reply(chat(), ResponderId::new(5), Some("Bo".into()), "sure")
            .await
            .unwrap();
        assert_eq!(recorded.response.survey_id(), &id);
        assert!(recorded.completed_survey());
    }

    #[tokio::test]
    async fn chat_reply_without_active_survey_fails() {
        let f = fixture();
        let err = f
            .lifecycle
            .record_chat_reply(ChatId::new(7), ResponderId::new(5), None, "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, SurveyError::NoActiveSurvey(c) if c == ChatId::new(7)));
    }

    #[tokio::test]
    async fn timed_out_survey_rejects_late_responses() {
        let f = fixture();
        let id = *f.lifecycle.create(chat(), "q?", 2).await.unwrap().id();

        let survey = f.lifecycle.mark_timed_out(&id).await.unwrap();
        assert_eq!(survey.status(), SurveyStatus::TimedOut);

        let err = f
            .lifecycle
            .record_response(&id, ResponderId::new(1), None, "late")
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SurveyNotActive);
        assert_eq!(f.lifecycle.response_count(&id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn mark_timed_out_leaves_completed_survey_alone() {
        let f = fixture();
        let id = *f.lifecycle.create(chat(), "q?", 1).await.unwrap().id();
        f.lifecycle
            .record_response(&id, ResponderId::new(1), None, "done")
            .await
            .unwrap();

        let survey = f.lifecycle.mark_timed_out(&id).await.unwrap();
        assert_eq!(survey.status(), SurveyStatus::Completed);
    }

    #[tokio::test]
    async fn cancel_frees_chat_and_is_not_repeatable() {
        let f = fixture();
        let id = *f.lifecycle.create(chat(), "q?", 1).await.unwrap().id();

        assert_eq!(f.lifecycle.cancel(&id).await.unwrap().status(), SurveyStatus::Cancelled);
        assert!(matches!(f.lifecycle.cancel(&id).await, Err(SurveyError::NotActive { .. })));
        f.lifecycle.create(chat(), "next?", 1).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_responses_complete_exactly_once() {
        let f = fixture();
        let lifecycle = Arc::new(f.lifecycle);
        let id = *lifecycle.create(chat(), "q?", 5).await.unwrap().id();

        let mut tasks = Vec::new();
        for n in 0..20 {
            let lifecycle = lifecycle.clone();
            tasks.push(tokio::spawn(async move {
                lifecycle
                    .record_response(&id, ResponderId::new(n), None, &format!("answer {n}"))
                    .await
            }));
        }

        let mut accepted = 0;
        let mut completions = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(recorded) => {
                    accepted += 1;
                    if recorded.completed_survey() {
                        completions += 1;
                    }
                }
                Err(err) => assert_eq!(err.code(), ErrorCode::SurveyNotActive),
            }
        }

        assert_eq!(accepted, 5);
        assert_eq!(completions, 1);
        assert_eq!(lifecycle.get_results(&id).await.unwrap().len(), 5);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn completes_exactly_at_expected_count(expected in 1u32..12) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let f = fixture();
                let id = *f.lifecycle.create(chat(), "q?", expected).await.unwrap().id();

                for n in 1..=expected {
                    let recorded = f
                        .lifecycle
                        .record_response(&id, ResponderId::new(n as i64), None, "x")
                        .await
                        .unwrap();
                    prop_assert_eq!(recorded.completed_survey(), n == expected);
                }
                Ok(())
            })?;
        }
    }
}
