//! CollectSurveyHandler - ask a chat a question and return the answers.
//!
//! Runs the whole flow for one request: interpret the free text, create the
//! survey (which broadcasts it) and wait for completion.

use std::sync::Arc;

use thiserror::Error;

use crate::application::{CompletionWaiter, SurveyLifecycle, WaitError};
use crate::domain::foundation::ErrorCode;
use crate::domain::survey::{Survey, SurveyError, SurveyRequest, SurveyResults};
use crate::ports::{InterpretError, RequestInterpreter};

/// Command carrying a natural-language survey request.
#[derive(Debug, Clone)]
pub struct CollectSurveyCommand {
    pub request: String,
}

/// Result of a completed collection.
#[derive(Debug, Clone)]
pub struct CollectSurveyResult {
    pub survey: Survey,
    pub results: SurveyResults,
}

impl CollectSurveyResult {
    /// Plain-text report of the collected answers.
    pub fn render(&self) -> String {
        let mut out = format!("Question: {}\n\nResponses:", self.results.question);
        for line in self.results.summary_lines() {
            out.push_str("\n- ");
            out.push_str(&line);
        }
        out
    }
}

/// Errors from the collection flow.
#[derive(Debug, Clone, Error)]
pub enum CollectSurveyError {
    #[error("Could not interpret request: {0}")]
    Interpret(#[from] InterpretError),

    #[error(transparent)]
    Survey(#[from] SurveyError),

    #[error(transparent)]
    Wait(#[from] WaitError),
}

impl CollectSurveyError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CollectSurveyError::Interpret(e) => e.code(),
            CollectSurveyError::Survey(e) => e.code(),
            CollectSurveyError::Wait(e) => e.code(),
        }
    }
}

/// Handler for the full ask-and-wait flow.
pub struct CollectSurveyHandler {
    interpreter: Arc<dyn RequestInterpreter>,
    lifecycle: Arc<SurveyLifecycle>,
    waiter: CompletionWaiter,
}

impl CollectSurveyHandler {
    pub fn new(
        interpreter: Arc<dyn RequestInterpreter>,
        lifecycle: Arc<SurveyLifecycle>,
        waiter: CompletionWaiter,
    ) -> Self {
        Self {
            interpreter,
            lifecycle,
            waiter,
        }
    }

    pub async fn handle(
        &self,
        cmd: CollectSurveyCommand,
    ) -> Result<CollectSurveyResult, CollectSurveyError> {
        let extracted = self.interpreter.extract(&cmd.request).await?;
        tracing::info!(
            chat_id = extracted.chat_id,
            expected_count = extracted.expected_count,
            "Interpreted survey request"
        );

        let request = SurveyRequest::try_from(extracted).map_err(SurveyError::from)?;
        self.handle_request(request).await
    }

    /// Same flow for parameters that need no interpretation.
    pub async fn handle_request(
        &self,
        request: SurveyRequest,
    ) -> Result<CollectSurveyResult, CollectSurveyError> {
        let survey = self.lifecycle.create_from(&request).await?;
        let results = self.waiter.await_completion(*survey.id()).await?;

        let survey = self.lifecycle.get_status(survey.id()).await?;
        Ok(CollectSurveyResult { survey, results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemorySurveyStore, RecordingGateway, StaticInterpreter};
    use crate::application::WaitSettings;
    use crate::domain::foundation::{ChatId, ResponderId, SurveyStatus};
    use std::time::Duration;

    struct Fixture {
        gateway: Arc<RecordingGateway>,
        lifecycle: Arc<SurveyLifecycle>,
        handler: CollectSurveyHandler,
    }

    fn fixture(interpreter: StaticInterpreter) -> Fixture {
        let gateway = Arc::new(RecordingGateway::new());
        let lifecycle = Arc::new(SurveyLifecycle::new(
            Arc::new(InMemorySurveyStore::new()),
            gateway.clone(),
        ));
        let settings = WaitSettings::default()
            .with_timeout(Duration::from_secs(30))
            .with_reminder_interval(Duration::from_secs(10))
            .with_poll_interval(Duration::from_secs(1));
        let waiter = CompletionWaiter::with_settings(lifecycle.clone(), gateway.clone(), settings);
        let handler = CollectSurveyHandler::new(Arc::new(interpreter), lifecycle.clone(), waiter);
        Fixture {
            gateway,
            lifecycle,
            handler,
        }
    }

    fn command(text: &str) -> CollectSurveyCommand {
        CollectSurveyCommand {
            request: text.to_string(),
        }
    }

    /// Answer the active survey of `chat` once it exists.
    fn answer_later(lifecycle: Arc<SurveyLifecycle>, chat: ChatId, answers: Vec<&'static str>) {
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            for (n, text) in answers.into_iter().enumerate() {
                lifecycle
                    .record_chat_reply(chat, ResponderId::new(n as i64 + 1), None, text)
                    .await
                    .unwrap();
            }
        });
    }

    #[tokio::test(start_paused = true)]
    async fn collects_answers_for_interpreted_request() {
        let interpreter = StaticInterpreter::new()
            .with_answer("chatId: -123\nquestion: Favorite food?\nexpectedCount: 2");
        let f = fixture(interpreter);
        answer_later(f.lifecycle.clone(), ChatId::new(-123), vec!["pasta", "tacos"]);

        let result = f
            .handler
            .handle(command("Ask 2 people in -123 about food"))
            .await
            .unwrap();

        assert_eq!(result.survey.status(), SurveyStatus::Completed);
        assert_eq!(result.results.answers(), vec!["pasta", "tacos"]);
        assert_eq!(f.gateway.sent_to(ChatId::new(-123)).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn render_lists_each_response() {
        let f = fixture(StaticInterpreter::new());
        answer_later(f.lifecycle.clone(), ChatId::new(5), vec!["yes"]);

        let request = SurveyRequest::new(ChatId::new(5), "Coming tonight?", 1).unwrap();
        let result = f.handler.handle_request(request).await.unwrap();

        assert_eq!(
            result.render(),
            "Question: Coming tonight?\n\nResponses:\n- User 1: yes"
        );
    }

    #[tokio::test]
    async fn malformed_extraction_is_invalid_parameter() {
        let f = fixture(StaticInterpreter::new().with_answer("no idea, sorry"));

        let err = f.handler.handle(command("???")).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidParameter);
        assert!(f.gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn zero_expected_count_is_invalid_parameter() {
        let f = fixture(
            StaticInterpreter::new().with_answer("chatId: 1\nquestion: q?\nexpectedCount: 0"),
        );

        let err = f.handler.handle(command("ask nobody")).await.unwrap_err();

        assert!(matches!(
            err,
            CollectSurveyError::Survey(SurveyError::InvalidParameter { ref field, .. }) if field == "expected_count"
        ));
    }

    #[tokio::test]
    async fn interpreter_outage_is_reported() {
        let f = fixture(StaticInterpreter::new().with_error(InterpretError::unavailable("503")));

        let err = f.handler.handle(command("ask someone")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InterpreterFailed);
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_survey_times_out() {
        let f = fixture(
            StaticInterpreter::new().with_answer("chatId: 9\nquestion: Anyone?\nexpectedCount: 3"),
        );

        let err = f.handler.handle(command("ask 3 in 9")).await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::Timeout);
        // broadcast plus reminders at 10s and 20s
        assert_eq!(f.gateway.sent_to(ChatId::new(9)).len(), 3);
    }
}
