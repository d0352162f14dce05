//! Prompt templates for the plan, solve and refine steps.
//!
//! Pure string construction; empty or odd input is embedded as-is.

use super::state::ResultStore;

/// Phrase the refine prompt asks the model to use when nothing should change.
pub const NO_CHANGES_SENTINEL: &str = "No changes needed";

pub fn build_plan_prompt(query: &str) -> String {
    format!(
        "Break down the following user query into subtasks:\n{}\n\nProvide a list of subtasks.",
        query
    )
}

pub fn build_solve_prompt(subtask: &str) -> String {
    format!(
        "Solve the following subtask:\n{}\n\nProvide the solution.",
        subtask
    )
}

/// Embeds solved subtask texts and their results, in solve order.
pub fn build_refine_prompt(results: &ResultStore) -> String {
    format!(
        "Review the subtasks and their results:\nSubtasks: {}\nResults: {}\n\nSuggest modifications, deletions, or additions to the subtasks. If no changes are needed, say '{}'.",
        render_list(&results.texts()),
        render_results(results),
        NO_CHANGES_SENTINEL
    )
}

fn quoted(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

/// `["a", "b"]`
fn render_list(items: &[&str]) -> String {
    let inner: Vec<String> = items.iter().map(|s| quoted(s)).collect();
    format!("[{}]", inner.join(", "))
}

/// `{"a": "result a", "b": "result b"}`, keeping solve order.
fn render_results(results: &ResultStore) -> String {
    let inner: Vec<String> = results
        .iter()
        .map(|e| format!("{}: {}", quoted(&e.subtask.text), quoted(&e.result)))
        .collect();
    format!("{{{}}}", inner.join(", "))
}
