//! Agent execution error types.
//!
//! Returned by `Node::run`, `LlmClient::invoke` and `CompiledStateGraph::invoke`.

use thiserror::Error;

/// Agent execution error.
///
/// A failing step aborts the whole run; there is no partial-result salvage and
/// no retry. Callers match on the variant to tell model failures from control
/// conditions (cancellation, recursion limit).
#[derive(Debug, Error)]
pub enum AgentError {
    /// The language model call failed (network, auth, rate limit, malformed response).
    #[error("model invocation failed: {0}")]
    ModelInvocation(String),

    /// Execution failed for a reason other than the model call (e.g. empty graph).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The caller cancelled the run; observed between two steps.
    #[error("run cancelled")]
    Cancelled,

    /// The run took more node steps than `RunnableConfig::recursion_limit` allows.
    #[error("recursion limit of {0} steps reached")]
    RecursionLimit(usize),
}

impl AgentError {
    /// True when the error came from the model call rather than the loop itself.
    pub fn is_model_invocation(&self) -> bool {
        matches!(self, AgentError::ModelInvocation(_))
    }
}
