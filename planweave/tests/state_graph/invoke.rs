//! StateGraph invoke and stream: linear chains, routers, errors.

use std::collections::HashMap;
use std::sync::Arc;

use planweave::{AgentError, StateGraph, StreamEvent, StreamMode, END, START};
use tokio_stream::StreamExt;

use crate::common::{AppendNode, FailingNode, TrailState};

#[tokio::test]
async fn invoke_linear_chain_runs_nodes_in_edge_order() {
    let mut graph = StateGraph::<TrailState>::new();
    graph
        .add_node("first", Arc::new(AppendNode::new("first")))
        .add_node("second", Arc::new(AppendNode::new("second")))
        .add_edge(START, "first")
        .add_edge("first", "second")
        .add_edge("second", END);

    let compiled = graph.compile().unwrap();
    let state = compiled.invoke(TrailState::default(), None).await.unwrap();
    assert_eq!(state.trail, vec!["first", "second"]);
}

/// **Scenario**: a router loops back until the state says stop.
#[tokio::test]
async fn invoke_conditional_loop_uses_path_map() {
    let path_map: HashMap<String, String> = [
        ("again".to_string(), "work".to_string()),
        ("done".to_string(), END.to_string()),
    ]
    .into_iter()
    .collect();
    let mut graph = StateGraph::<TrailState>::new();
    graph
        .add_node("work", Arc::new(AppendNode::new("work")))
        .add_edge(START, "work")
        .add_conditional_edges(
            "work",
            Arc::new(|s: &TrailState| {
                let key = if s.trail.len() < 3 { "again" } else { "done" };
                key.to_string()
            }),
            Some(path_map),
        );

    let compiled = graph.compile().unwrap();
    let state = compiled.invoke(TrailState::default(), None).await.unwrap();
    assert_eq!(state.trail, vec!["work", "work", "work"]);
}

#[tokio::test]
async fn invoke_propagates_node_error() {
    let mut graph = StateGraph::<TrailState>::new();
    graph
        .add_node("a", Arc::new(AppendNode::new("a")))
        .add_node("failing", Arc::new(FailingNode))
        .add_edge(START, "a")
        .add_edge("a", "failing")
        .add_edge("failing", END);

    let compiled = graph.compile().unwrap();
    match compiled.invoke(TrailState::default(), None).await {
        Err(AgentError::ExecutionFailed(msg)) => assert_eq!(msg, "always fails"),
        other => panic!("expected ExecutionFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn stream_updates_follow_node_order() {
    let mut graph = StateGraph::<TrailState>::new();
    graph
        .add_node("first", Arc::new(AppendNode::new("first")))
        .add_node("second", Arc::new(AppendNode::new("second")))
        .add_edge(START, "first")
        .add_edge("first", "second")
        .add_edge("second", END);

    let compiled = graph.compile().unwrap();
    let events: Vec<_> = compiled
        .stream(TrailState::default(), None, [StreamMode::Updates])
        .collect()
        .await;
    let ids: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Updates { node_id, .. } => Some(node_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec!["first", "second"]);
    assert!(events.iter().all(|e| e.mode() == StreamMode::Updates));
}
