//! Finalize node: assembles the answer from the result store.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node, RunContext, RunnableConfig};
use crate::stream::StreamEvent;

use super::state::{PlanState, ResultStore};
use super::transition::{next_phase, LoopPhase, FINALIZE_NODE};

/// Answer when nothing was solved.
pub const NO_RESULTS: &str = "No results generated.";

/// `"<subtask>: <result>"` per solved subtask in solve order, joined by newlines.
pub fn assemble_result(results: &ResultStore) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }
    results
        .iter()
        .map(|e| format!("{}: {}", e.subtask.text, e.result))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sets `final_result`; running it twice gives the same state.
pub fn finalize_step(state: &PlanState) -> PlanState {
    let mut next = state.clone();
    next.final_result = Some(assemble_result(&state.results));
    next.phase = next_phase(LoopPhase::Finalizing, &next);
    next
}

pub struct FinalizeNode;

#[async_trait]
impl Node<PlanState> for FinalizeNode {
    fn id(&self) -> &str {
        FINALIZE_NODE
    }

    async fn run(&self, state: PlanState) -> Result<(PlanState, Next), AgentError> {
        let ctx = RunContext::new(RunnableConfig::default());
        self.run_with_context(state, &ctx).await
    }

    async fn run_with_context(
        &self,
        state: PlanState,
        ctx: &RunContext<PlanState>,
    ) -> Result<(PlanState, Next), AgentError> {
        let next = finalize_step(&state);
        ctx.emit(StreamEvent::Finalized {
            solved_count: next.results.len(),
        })
        .await;
        Ok((next, Next::End))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::plan::state::{Subtask, SubtaskId};

    #[test]
    fn empty_store_yields_no_results_message() {
        assert_eq!(assemble_result(&ResultStore::new()), "No results generated.");
    }

    #[test]
    fn results_joined_in_solve_order() {
        let mut results = ResultStore::new();
        results.record(Subtask::new(SubtaskId::new(1), "Book flight"), "JAL");
        results.record(Subtask::new(SubtaskId::new(2), "Book hotel"), "Ryokan");
        assert_eq!(assemble_result(&results), "Book flight: JAL\nBook hotel: Ryokan");
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut state = PlanState::new("q", 3);
        let s = state.allocate_subtasks(["a"]);
        state.results.record(s[0].clone(), "b");
        let once = finalize_step(&state);
        let twice = finalize_step(&once);
        assert_eq!(once, twice);
        assert_eq!(once.final_result.as_deref(), Some("a: b"));
        assert_eq!(once.phase, LoopPhase::Done);
    }
}
