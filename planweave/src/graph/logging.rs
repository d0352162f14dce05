//! Structured logging for graph execution.

use std::fmt::Debug;

use crate::error::AgentError;
use crate::graph::Next;

pub fn log_node_start(node_id: &str) {
    tracing::debug!(node_id = node_id, "Starting node execution");
}

/// Logs the input state of a node at trace level; plan states can be large.
pub fn log_node_state<S: Debug>(node_id: &str, state: &S) {
    tracing::trace!(node_id = node_id, state = ?state, "Node execution: state");
}

pub fn log_node_complete(node_id: &str, next: &Next) {
    tracing::debug!(node_id = node_id, ?next, "Node execution complete");
}

/// Logs the routing decision taken after a node.
pub fn log_route(from: &str, to: &str) {
    tracing::debug!(from = from, to = to, "routing");
}

pub fn log_graph_start(run_id: Option<&str>) {
    tracing::info!(run_id = run_id.unwrap_or("-"), "Starting graph execution");
}

pub fn log_graph_complete(run_id: Option<&str>, steps: usize) {
    tracing::info!(
        run_id = run_id.unwrap_or("-"),
        steps,
        "Graph execution complete"
    );
}

pub fn log_graph_error(error: &AgentError) {
    tracing::error!(?error, "Graph execution error");
}
