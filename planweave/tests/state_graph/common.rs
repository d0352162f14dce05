//! Shared types for StateGraph integration tests: TrailState, AppendNode, FailingNode.

use async_trait::async_trait;
use planweave::{AgentError, Next, Node};

/// Records which nodes ran, in order.
#[derive(Debug, Clone, Default)]
pub struct TrailState {
    pub trail: Vec<String>,
}

/// Appends its id to the trail and continues along its edge.
pub struct AppendNode {
    id: &'static str,
}

impl AppendNode {
    pub fn new(id: &'static str) -> Self {
        Self { id }
    }
}

#[async_trait]
impl Node<TrailState> for AppendNode {
    fn id(&self) -> &str {
        self.id
    }

    async fn run(&self, mut state: TrailState) -> Result<(TrailState, Next), AgentError> {
        state.trail.push(self.id.to_string());
        Ok((state, Next::Continue))
    }
}

/// Node that always returns Err. Used to test error propagation.
pub struct FailingNode;

#[async_trait]
impl Node<TrailState> for FailingNode {
    fn id(&self) -> &str {
        "failing"
    }

    async fn run(&self, _state: TrailState) -> Result<(TrailState, Next), AgentError> {
        Err(AgentError::ExecutionFailed("always fails".into()))
    }
}
