//! Streaming types for graph runs.
//!
//! `StreamMode` selects which events a run emits; `StreamEvent` is what arrives
//! on the channel. Generic events (values, updates, tasks) come from the graph
//! run loop; plan events come from the plan agent nodes and are only sent when
//! `StreamMode::Custom` is enabled.

use std::collections::HashSet;

use serde::Serialize;

/// Which kinds of events a streamed run emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamMode {
    /// Full state after every node.
    Values,
    /// Node id plus state after every node.
    Updates,
    /// Task start/end around every node.
    Tasks,
    /// Events emitted by nodes themselves (plan created, subtask solved, ...).
    Custom,
}

impl StreamMode {
    /// Every mode.
    pub fn all() -> HashSet<StreamMode> {
        [
            StreamMode::Values,
            StreamMode::Updates,
            StreamMode::Tasks,
            StreamMode::Custom,
        ]
        .into_iter()
        .collect()
    }
}

/// Event emitted during a streamed run.
#[derive(Debug, Clone)]
pub enum StreamEvent<S> {
    /// Full state after a node ran.
    Values(S),
    /// State after the given node ran.
    Updates { node_id: String, state: S },
    /// A node is about to run.
    TaskStart { node_id: String },
    /// A node finished; `Err` carries the error text.
    TaskEnd {
        node_id: String,
        result: Result<(), String>,
    },
    /// A plan step produced its initial subtasks.
    PlanCreated(PlanEvent),
    /// One subtask was solved.
    SubtaskSolved(SolveEvent),
    /// A refine step ran and bumped the iteration count.
    Refined(RefineEvent),
    /// The final answer was assembled.
    Finalized { solved_count: usize },
}

/// Payload of `StreamEvent::PlanCreated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEvent {
    pub subtasks: Vec<String>,
}

/// Payload of `StreamEvent::SubtaskSolved`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolveEvent {
    pub subtask_id: u64,
    pub subtask: String,
    pub remaining: usize,
}

/// Payload of `StreamEvent::Refined`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefineEvent {
    /// Iteration count after the increment.
    pub iteration: u32,
    /// New subtasks appended to the queue.
    pub added: Vec<String>,
    /// The model answered with the no-changes sentinel.
    pub no_changes: bool,
}

impl<S> StreamEvent<S> {
    /// Short label used by the CLI progress output and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Values(_) => "values",
            StreamEvent::Updates { .. } => "updates",
            StreamEvent::TaskStart { .. } => "task_start",
            StreamEvent::TaskEnd { .. } => "task_end",
            StreamEvent::PlanCreated(_) => "plan_created",
            StreamEvent::SubtaskSolved(_) => "subtask_solved",
            StreamEvent::Refined(_) => "refined",
            StreamEvent::Finalized { .. } => "finalized",
        }
    }

    /// Whether the event belongs to the given mode.
    pub fn mode(&self) -> StreamMode {
        match self {
            StreamEvent::Values(_) => StreamMode::Values,
            StreamEvent::Updates { .. } => StreamMode::Updates,
            StreamEvent::TaskStart { .. } | StreamEvent::TaskEnd { .. } => StreamMode::Tasks,
            _ => StreamMode::Custom,
        }
    }
}
