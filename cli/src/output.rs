//! Rendering a `PlanOutcome` (or the loop topology) as text, JSON or DOT, and
//! writing it to stdout or a file.

use std::io::Write;
use std::path::Path;

use clap::ValueEnum;
use planweave::{generate_dot, generate_text, LifecycleGraph, LifecycleHistory, PlanOutcome, PlanRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Final answer, then the history when requested.
    #[default]
    Text,
    /// `{"final_result": ..., "history": [...]}`
    Json,
    /// Lifecycle graph in Graphviz DOT.
    Dot,
}

impl OutputFormat {
    /// DOT output is built from the history, so it needs one.
    pub fn needs_history(self) -> bool {
        self == OutputFormat::Dot
    }
}

fn subtask_list(subtasks: &[planweave::Subtask]) -> String {
    if subtasks.is_empty() {
        return "-".to_string();
    }
    subtasks
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn history_text(history: &LifecycleHistory) -> String {
    let mut out = String::from("Lifecycle history:");
    for (i, record) in history.records().iter().enumerate() {
        out.push_str(&format!(
            "\nIteration {}:\n  generated: {}\n  solved: {}\n  refined: {}",
            i + 1,
            subtask_list(&record.generated),
            subtask_list(&record.solved),
            subtask_list(&record.refined)
        ));
    }
    out
}

/// Renders `outcome` in `format`; `pretty` only affects JSON.
pub fn render_outcome(
    outcome: &PlanOutcome,
    format: OutputFormat,
    pretty: bool,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(match &outcome.history {
            Some(history) => format!("{}\n\n{}", outcome.final_result, history_text(history)),
            None => outcome.final_result.clone(),
        }),
        OutputFormat::Json if pretty => serde_json::to_string_pretty(outcome),
        OutputFormat::Json => serde_json::to_string(outcome),
        OutputFormat::Dot => {
            let history = outcome.history.clone().unwrap_or_default();
            Ok(LifecycleGraph::from_history(&history).to_dot())
        }
    }
}

/// The compiled loop as DOT (`Dot`, `Json`) or an edge list (`Text`).
pub fn render_topology(runner: &PlanRunner, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => generate_text(runner.graph()),
        OutputFormat::Json | OutputFormat::Dot => generate_dot(runner.graph()),
    }
}

/// Writes `content` plus a trailing newline to `file`, or to stdout.
pub fn write_output(content: &str, file: Option<&Path>) -> std::io::Result<()> {
    let content = content.trim_end_matches('\n');
    match file {
        Some(path) => std::fs::write(path, format!("{}\n", content)),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", content)?;
            stdout.flush()
        }
    }
}
