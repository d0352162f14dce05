//! StateGraph middleware: with_middleware().compile() wraps every node run.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use planweave::graph::NodeCall;
use planweave::{AgentError, Next, NodeMiddleware, StateGraph, END, START};

use crate::common::{AppendNode, TrailState};

/// Records node ids as they run.
struct RecordingMiddleware {
    entered: Mutex<Vec<String>>,
}

impl RecordingMiddleware {
    fn new() -> Self {
        Self {
            entered: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl NodeMiddleware<TrailState> for RecordingMiddleware {
    async fn around_run(
        &self,
        node_id: &str,
        state: TrailState,
        inner: NodeCall<TrailState>,
    ) -> Result<(TrailState, Next), AgentError> {
        self.entered.lock().unwrap().push(node_id.to_string());
        inner(state).await
    }
}

/// Middleware that never calls the node and ends the run.
struct ShortCircuit;

#[async_trait]
impl NodeMiddleware<TrailState> for ShortCircuit {
    async fn around_run(
        &self,
        node_id: &str,
        mut state: TrailState,
        _inner: NodeCall<TrailState>,
    ) -> Result<(TrailState, Next), AgentError> {
        state.trail.push(format!("skipped {}", node_id));
        Ok((state, Next::End))
    }
}

#[tokio::test]
async fn with_middleware_wraps_each_node_run() {
    let middleware = Arc::new(RecordingMiddleware::new());
    let mut graph = StateGraph::<TrailState>::new();
    graph
        .add_node("a", Arc::new(AppendNode::new("a")))
        .add_node("b", Arc::new(AppendNode::new("b")))
        .add_edge(START, "a")
        .add_edge("a", "b")
        .add_edge("b", END);

    let compiled = graph.with_middleware(middleware.clone()).compile().unwrap();
    let state = compiled.invoke(TrailState::default(), None).await.unwrap();

    assert_eq!(state.trail, vec!["a", "b"]);
    assert_eq!(*middleware.entered.lock().unwrap(), vec!["a", "b"]);
}

/// **Scenario**: middleware decides the outcome when it does not call `inner`.
#[tokio::test]
async fn middleware_can_short_circuit() {
    let mut graph = StateGraph::<TrailState>::new();
    graph
        .add_node("a", Arc::new(AppendNode::new("a")))
        .add_node("b", Arc::new(AppendNode::new("b")))
        .add_edge(START, "a")
        .add_edge("a", "b")
        .add_edge("b", END);

    let compiled = graph.with_middleware(Arc::new(ShortCircuit)).compile().unwrap();
    let state = compiled.invoke(TrailState::default(), None).await.unwrap();
    assert_eq!(state.trail, vec!["skipped a"]);
}
