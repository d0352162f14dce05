//! StateGraph compile failure cases: unknown node, missing START/END, ambiguous edges.

use std::collections::HashMap;
use std::sync::Arc;

use planweave::{CompilationError, StateGraph, END, START};

use crate::common::{AppendNode, TrailState};

/// **Scenario**: When an edge references a node not registered via add_node, compile returns NodeNotFound.
#[test]
fn compile_fails_when_edge_refers_to_unknown_node() {
    let mut graph = StateGraph::<TrailState>::new();
    graph
        .add_node("a", Arc::new(AppendNode::new("a")))
        .add_edge(START, "a")
        .add_edge("a", "missing");

    match graph.compile() {
        Err(CompilationError::NodeNotFound(id)) => assert_eq!(id, "missing"),
        Ok(_) => panic!("expected NodeNotFound"),
        Err(e) => panic!("expected NodeNotFound, got {:?}", e),
    }
}

/// **Scenario**: When no edge has from_id == START, compile returns MissingStart.
#[test]
fn compile_fails_when_no_edge_from_start() {
    let mut graph = StateGraph::<TrailState>::new();
    graph
        .add_node("a", Arc::new(AppendNode::new("a")))
        .add_edge("a", END);

    assert!(matches!(graph.compile(), Err(CompilationError::MissingStart)));
}

/// **Scenario**: When nothing routes to END, compile returns MissingEnd.
#[test]
fn compile_fails_when_no_edge_to_end() {
    let mut graph = StateGraph::<TrailState>::new();
    graph
        .add_node("a", Arc::new(AppendNode::new("a")))
        .add_edge(START, "a");

    assert!(matches!(graph.compile(), Err(CompilationError::MissingEnd)));
}

#[test]
fn compile_fails_when_node_has_two_outgoing_edges() {
    let mut graph = StateGraph::<TrailState>::new();
    graph
        .add_node("a", Arc::new(AppendNode::new("a")))
        .add_node("b", Arc::new(AppendNode::new("b")))
        .add_edge(START, "a")
        .add_edge("a", "b")
        .add_edge("a", END)
        .add_edge("b", END);

    assert!(matches!(graph.compile(), Err(CompilationError::InvalidChain(_))));
}

/// **Scenario**: A node with both an edge and a router is ambiguous.
#[test]
fn compile_fails_when_node_has_edge_and_conditional() {
    let mut graph = StateGraph::<TrailState>::new();
    graph
        .add_node("a", Arc::new(AppendNode::new("a")))
        .add_edge(START, "a")
        .add_edge("a", END)
        .add_conditional_edges("a", Arc::new(|_: &TrailState| END.to_string()), None);

    match graph.compile() {
        Err(CompilationError::NodeHasBothEdgeAndConditional(id)) => assert_eq!(id, "a"),
        Ok(_) => panic!("expected NodeHasBothEdgeAndConditional"),
        Err(e) => panic!("expected NodeHasBothEdgeAndConditional, got {:?}", e),
    }
}

#[test]
fn compile_fails_when_path_map_targets_unknown_node() {
    let path_map: HashMap<String, String> =
        [("next".to_string(), "nowhere".to_string())].into_iter().collect();
    let mut graph = StateGraph::<TrailState>::new();
    graph
        .add_node("a", Arc::new(AppendNode::new("a")))
        .add_edge(START, "a")
        .add_conditional_edges(
            "a",
            Arc::new(|_: &TrailState| "next".to_string()),
            Some(path_map),
        );

    match graph.compile() {
        Err(CompilationError::InvalidConditionalPathMap(target)) => assert_eq!(target, "nowhere"),
        Ok(_) => panic!("expected InvalidConditionalPathMap"),
        Err(e) => panic!("expected InvalidConditionalPathMap, got {:?}", e),
    }
}

#[test]
fn compile_fails_on_cycle_without_conditional_edges() {
    let mut graph = StateGraph::<TrailState>::new();
    graph
        .add_node("a", Arc::new(AppendNode::new("a")))
        .add_node("b", Arc::new(AppendNode::new("b")))
        .add_node("c", Arc::new(AppendNode::new("c")))
        .add_edge(START, "a")
        .add_edge("a", "b")
        .add_edge("b", "a")
        .add_edge("c", END);

    assert!(matches!(graph.compile(), Err(CompilationError::InvalidChain(_))));
}
