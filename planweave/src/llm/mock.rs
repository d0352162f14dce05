//! Mock LLM for tests and offline runs.
//!
//! Replays a script of responses (or failures) in call order, then falls back to
//! a fixed response. Records every prompt so tests can assert on what the loop sent.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;

/// Mock LLM: scripted replies in call order.
///
/// Each call pops the next scripted entry; `Ok(text)` is returned as content,
/// `Err(msg)` becomes [`AgentError::ModelInvocation`]. When the script is empty
/// the fallback is used (by default a failure, so unexpected extra calls show up
/// in tests).
///
/// **Interaction**: Implements `LlmClient`; used by the plan agent tests.
pub struct MockLlm {
    script: Mutex<VecDeque<Result<String, String>>>,
    fallback: Result<String, String>,
    prompts: Mutex<Vec<String>>,
    call_count: AtomicUsize,
}

impl MockLlm {
    /// Creates a mock that always returns `content`.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Ok(content.into()),
            prompts: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Creates a mock that returns each of `responses` once, in order.
    pub fn scripted<I, T>(responses: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            script: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            fallback: Err("mock script exhausted".to_string()),
            prompts: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Creates a mock whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Appends one successful response to the script (builder).
    pub fn then(self, content: impl Into<String>) -> Self {
        self.lock_script().push_back(Ok(content.into()));
        self
    }

    /// Appends one failing call to the script (builder).
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.lock_script().push_back(Err(message.into()));
        self
    }

    /// Sets the response used once the script is exhausted (builder).
    pub fn with_fallback(mut self, content: impl Into<String>) -> Self {
        self.fallback = Ok(content.into());
        self
    }

    /// Number of `invoke` calls so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Prompts seen so far (content of the last message of each call).
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, String>>> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let prompt = messages
            .last()
            .map(|m| m.content().to_string())
            .unwrap_or_default();
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt);

        let next = self
            .lock_script()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match next {
            Ok(content) => Ok(LlmResponse {
                content,
                usage: None,
            }),
            Err(message) => Err(AgentError::ModelInvocation(message)),
        }
    }
}
