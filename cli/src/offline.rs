//! Offline model: answers from the prompt itself so the loop can be tried
//! without an API key (`--offline`).

use async_trait::async_trait;
use planweave::{AgentError, LlmClient, LlmResponse, Message};

const PLAN_PREFIX: &str = "Break down the following user query into subtasks:\n";
const SOLVE_PREFIX: &str = "Solve the following subtask:\n";

/// Deterministic stand-in for a chat model.
///
/// - plan prompt: three generic subtasks for the query
/// - solve prompt: a placeholder answer naming the subtask
/// - anything else (refine): "No changes needed"
#[derive(Debug, Default)]
pub struct OfflineLlm;

impl OfflineLlm {
    fn answer(prompt: &str) -> String {
        if let Some(rest) = prompt.strip_prefix(PLAN_PREFIX) {
            let query = first_line(rest);
            return format!(
                "Clarify the goal of \"{}\"\nList the concrete steps\nCheck the plan against the goal",
                query
            );
        }
        if let Some(rest) = prompt.strip_prefix(SOLVE_PREFIX) {
            return format!("(offline) draft answer for: {}", first_line(rest));
        }
        "No changes needed".to_string()
    }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("").trim()
}

#[async_trait]
impl LlmClient for OfflineLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let prompt = messages.last().map(Message::content).unwrap_or_default();
        Ok(LlmResponse {
            content: Self::answer(prompt),
            usage: None,
        })
    }
}
