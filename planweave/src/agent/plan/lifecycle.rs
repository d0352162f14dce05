//! Subtask lifecycle graph built from a run's history.
//!
//! One node per iteration (`Iteration N`) and one per subtask stage
//! (`"<text> (Generated|Solved|Refined, Iter N)"`). Edges link an iteration to
//! what it generated, and a stage to the next stage of the same text within
//! the same iteration when that earlier stage exists. Render with
//! [`LifecycleGraph::to_dot`] or serialize as JSON.

use std::collections::HashSet;
use std::fmt::Write;

use serde::Serialize;

use super::state::{LifecycleHistory, Subtask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Iteration,
    Generated,
    Solved,
    Refined,
}

impl Stage {
    pub fn color(self) -> &'static str {
        match self {
            Stage::Iteration => "lightblue",
            Stage::Generated => "lightgreen",
            Stage::Solved => "yellow",
            Stage::Refined => "lightcoral",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Stage::Iteration => "Iteration",
            Stage::Generated => "Generated",
            Stage::Solved => "Solved",
            Stage::Refined => "Refined",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleNode {
    /// Unique key, e.g. `"Book flight (Solved, Iter 1)"`.
    pub id: String,
    /// Display text: the subtask text, or `Iteration N`.
    pub label: String,
    pub stage: Stage,
    /// 1-based iteration number.
    pub iteration: usize,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleEdge {
    pub from: String,
    pub to: String,
    pub label: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LifecycleGraph {
    pub nodes: Vec<LifecycleNode>,
    pub edges: Vec<LifecycleEdge>,
}

fn stage_node_id(text: &str, stage: Stage, iteration: usize) -> String {
    format!("{} ({}, Iter {})", text, stage.name(), iteration)
}

impl LifecycleGraph {
    pub fn from_history(history: &LifecycleHistory) -> Self {
        let mut builder = Builder::default();
        for (index, record) in history.records().iter().enumerate() {
            let iteration = index + 1;
            let iteration_id = format!("Iteration {}", iteration);
            builder.node(&iteration_id, &iteration_id, Stage::Iteration, iteration);

            for subtask in &record.generated {
                let id = builder.stage_node(subtask, Stage::Generated, iteration);
                builder.edge(&iteration_id, &id, "Generated");
            }
            builder.stage_with_predecessor(&record.solved, Stage::Solved, Stage::Generated, iteration);
            builder.stage_with_predecessor(&record.refined, Stage::Refined, Stage::Solved, iteration);
        }
        builder.graph
    }

    pub fn node(&self, id: &str) -> Option<&LifecycleNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Graphviz DOT, one filled node per entry.
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph lifecycle {\n");
        dot.push_str("  rankdir=TB;\n");
        dot.push_str("  node [shape=box, style=filled];\n\n");
        for n in &self.nodes {
            let _ = writeln!(
                dot,
                "  \"{}\" [label=\"{}\", fillcolor={}];",
                escape(&n.id),
                escape(&n.label),
                n.color
            );
        }
        if !self.edges.is_empty() {
            dot.push('\n');
        }
        for e in &self.edges {
            let _ = writeln!(
                dot,
                "  \"{}\" -> \"{}\" [label=\"{}\"];",
                escape(&e.from),
                escape(&e.to),
                e.label
            );
        }
        dot.push_str("}\n");
        dot
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// Collects nodes and edges, ignoring repeats of the same id or pair.
#[derive(Default)]
struct Builder {
    graph: LifecycleGraph,
    node_ids: HashSet<String>,
    edge_keys: HashSet<(String, String)>,
}

impl Builder {
    fn node(&mut self, id: &str, label: &str, stage: Stage, iteration: usize) {
        if self.node_ids.insert(id.to_string()) {
            self.graph.nodes.push(LifecycleNode {
                id: id.to_string(),
                label: label.to_string(),
                stage,
                iteration,
                color: stage.color(),
            });
        }
    }

    fn stage_node(&mut self, subtask: &Subtask, stage: Stage, iteration: usize) -> String {
        let id = stage_node_id(&subtask.text, stage, iteration);
        self.node(&id, &subtask.text, stage, iteration);
        id
    }

    fn edge(&mut self, from: &str, to: &str, label: &'static str) {
        if self
            .edge_keys
            .insert((from.to_string(), to.to_string()))
        {
            self.graph.edges.push(LifecycleEdge {
                from: from.to_string(),
                to: to.to_string(),
                label,
            });
        }
    }

    fn stage_with_predecessor(
        &mut self,
        subtasks: &[Subtask],
        stage: Stage,
        predecessor: Stage,
        iteration: usize,
    ) {
        for subtask in subtasks {
            let id = self.stage_node(subtask, stage, iteration);
            let from = stage_node_id(&subtask.text, predecessor, iteration);
            if self.node_ids.contains(&from) {
                self.edge(&from, &id, stage.name());
            }
        }
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
