//! LLM client abstraction used by the plan, solve and refine nodes.
//!
//! The loop only needs one capability from a model: prompt text in, generated
//! text out, or a failure. [`LlmClient::invoke`] takes a message list so that
//! chat-style backends map naturally; [`LlmClient::invoke_prompt`] is the
//! single-prompt form the plan agent uses.

mod mock;
mod openai;

pub use mock::MockLlm;
pub use openai::ChatOpenAI;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;

/// Token usage for one LLM call (prompt + completion).
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    /// Tokens in the prompt (input).
    pub prompt_tokens: u32,
    /// Tokens in the completion (output).
    pub completion_tokens: u32,
    /// Total tokens (prompt + completion).
    pub total_tokens: u32,
}

/// Response from an LLM completion.
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    /// Token usage for this call, when the backend reports it.
    pub usage: Option<LlmUsage>,
}

/// LLM client: given messages, returns assistant text.
///
/// Implementations: [`MockLlm`] (scripted responses for tests), [`ChatOpenAI`]
/// (any OpenAI-compatible Chat Completions endpoint). A failing call must return
/// [`AgentError::ModelInvocation`]; the loop never retries it.
///
/// Wrap a client with your own timeout if you need bounded latency; a call that
/// never returns stalls the run.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invoke one turn: read messages, return assistant content.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;

    /// Sends `prompt` as a single user message and returns the reply text.
    async fn invoke_prompt(&self, prompt: &str) -> Result<String, AgentError> {
        let response = self.invoke(&[Message::user(prompt)]).await?;
        if let Some(usage) = &response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "llm usage"
            );
        }
        Ok(response.content)
    }
}
