//! Per-run configuration passed to `CompiledStateGraph::invoke`.

use tokio_util::sync::CancellationToken;

/// Config for one graph run.
///
/// All fields are optional; `RunnableConfig::default()` runs to completion with
/// no step limit and no cancellation.
#[derive(Debug, Clone, Default)]
pub struct RunnableConfig {
    /// Identifier attached to log spans and stream consumers. Generated by the
    /// runner when absent.
    pub run_id: Option<String>,
    /// Maximum node executions before the run fails with `AgentError::RecursionLimit`.
    pub recursion_limit: Option<usize>,
    /// When cancelled, the run stops before the next node with `AgentError::Cancelled`.
    pub cancellation: Option<CancellationToken>,
}

impl RunnableConfig {
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = Some(limit);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// True when a cancellation token is set and has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}
