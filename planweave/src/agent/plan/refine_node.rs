//! Refine node: the model reviews solved work and may add subtasks.
//!
//! Does nothing until at least one subtask is solved. Each real refine bumps
//! the iteration count by one, whatever the model answers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node, RunContext, RunnableConfig};
use crate::llm::LlmClient;
use crate::stream::{RefineEvent, StreamEvent};

use super::parse::parse_subtask_lines;
use super::prompt::{build_refine_prompt, NO_CHANGES_SENTINEL};
use super::state::{PlanState, Subtask};
use super::transition::{next_phase, LoopPhase, REFINE_NODE};

/// Outcome of one refine step, for events and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefineOutcome {
    pub added: Vec<Subtask>,
    pub no_changes: bool,
}

/// Applies a refine response; assumes the step is not a no-op.
///
/// Candidates whose text already has a result are dropped. The rest are queued
/// and become the open record's `refined` list; a new record opens when they
/// are non-empty or work is still pending.
pub fn apply_refine(state: &PlanState, response: &str) -> (PlanState, RefineOutcome) {
    let mut next = state.clone();
    next.iteration_count += 1;
    next.phase = next_phase(LoopPhase::Refining, &next);

    if response.contains(NO_CHANGES_SENTINEL) {
        return (
            next,
            RefineOutcome {
                added: Vec::new(),
                no_changes: true,
            },
        );
    }

    let candidates: Vec<String> = parse_subtask_lines(response)
        .into_iter()
        .filter(|text| !state.results.contains_text(text))
        .collect();
    let added = next.allocate_subtasks(candidates);
    next.queue.extend(added.iter().cloned());
    next.history.open_record_mut().refined = added.clone();
    if !added.is_empty() || !next.queue.is_empty() {
        next.history.open(added.clone());
    }
    (
        next,
        RefineOutcome {
            added,
            no_changes: false,
        },
    )
}

/// Refine step: one model call unless nothing has been solved yet.
pub async fn refine_step(
    llm: &dyn LlmClient,
    state: &PlanState,
) -> Result<(PlanState, Option<RefineOutcome>), AgentError> {
    if state.results.is_empty() {
        tracing::debug!("refine: no results yet, skipping");
        let mut next = state.clone();
        next.phase = next_phase(LoopPhase::Refining, &next);
        return Ok((next, None));
    }
    let response = llm.invoke_prompt(&build_refine_prompt(&state.results)).await?;
    let (next, outcome) = apply_refine(state, &response);
    Ok((next, Some(outcome)))
}

pub struct RefineNode {
    llm: Arc<dyn LlmClient>,
}

impl RefineNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<PlanState> for RefineNode {
    fn id(&self) -> &str {
        REFINE_NODE
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
        let (next, outcome) = refine_step(self.llm.as_ref(), &state).await?;
        if let Some(outcome) = outcome {
            tracing::info!(
                iteration = next.iteration_count,
                max_iterations = next.max_iterations,
                added = outcome.added.len(),
                no_changes = outcome.no_changes,
                "refinement applied"
            );
            ctx.emit(StreamEvent::Refined(RefineEvent {
                iteration: next.iteration_count,
                added: outcome.added.into_iter().map(|s| s.text).collect(),
                no_changes: outcome.no_changes,
            }))
            .await;
        }
        Ok((next, Next::Continue))
    }
}
