//! Scripted request interpreter for tests.
//!
//! Returns pre-configured answers in order and records every request it
//! was asked to interpret.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::domain::survey::{parse_extraction, ExtractedRequest};
use crate::ports::{InterpretError, RequestInterpreter};

#[derive(Debug, Default)]
struct State {
    answers: VecDeque<Result<String, InterpretError>>,
    calls: Vec<String>,
}

/// Interpreter that replays scripted model answers.
///
/// Answers are raw text in the three-line format, so parsing is exercised
/// exactly as with a real model.
#[derive(Debug, Default)]
pub struct StaticInterpreter {
    state: Mutex<State>,
}

impl StaticInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw model answer.
    pub fn with_answer(self, text: impl Into<String>) -> Self {
        self.lock().answers.push_back(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, err: InterpretError) -> Self {
        self.lock().answers.push_back(Err(err));
        self
    }

    /// Free-text requests received so far.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RequestInterpreter for StaticInterpreter {
    async fn extract(&self, free_text: &str) -> Result<ExtractedRequest, InterpretError> {
        let answer = {
            let mut state = self.lock();
            state.calls.push(free_text.to_string());
            state.answers.pop_front()
        };

        match answer {
            Some(Ok(text)) => Ok(parse_extraction(&text)?),
            Some(Err(err)) => Err(err),
            None => Err(InterpretError::unavailable("no scripted answer left")),
        }
    }
}
