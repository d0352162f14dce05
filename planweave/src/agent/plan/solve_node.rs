//! Solve node: answers the subtask at the front of the queue.
//!
//! The subtask is only popped once the model has answered, so a failed call
//! leaves the queue as it was. The node also decides the next phase via
//! `after_solve`; the graph router reads it from `state.phase`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node, RunContext, RunnableConfig};
use crate::llm::LlmClient;
use crate::stream::{SolveEvent, StreamEvent};

use super::prompt::build_solve_prompt;
use super::state::PlanState;
use super::transition::{next_phase, LoopPhase, SOLVE_NODE};

/// Records `result` for the front subtask and pops it.
///
/// With an empty queue only the phase is recomputed.
pub fn apply_solve(state: &PlanState, result: &str) -> PlanState {
    let mut next = state.clone();
    if let Some(subtask) = next.queue.pop_front() {
        next.results.record(subtask.clone(), result);
        next.history.open_record_mut().solved.push(subtask.clone());
        next.current_subtask = Some(subtask);
    }
    next.phase = next_phase(LoopPhase::Solving, &next);
    next
}

/// Solve step: at most one model call, for the front subtask.
pub async fn solve_step(llm: &dyn LlmClient, state: &PlanState) -> Result<PlanState, AgentError> {
    let Some(front) = state.queue.front() else {
        tracing::debug!("solve: queue empty, nothing to do");
        return Ok(apply_solve(state, ""));
    };
    let result = llm.invoke_prompt(&build_solve_prompt(&front.text)).await?;
    Ok(apply_solve(state, &result))
}

pub struct SolveNode {
    llm: Arc<dyn LlmClient>,
}

impl SolveNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<PlanState> for SolveNode {
    fn id(&self) -> &str {
        SOLVE_NODE
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
        let next = solve_step(self.llm.as_ref(), &state).await?;
        let popped = next.queue.len() < state.queue.len();
        if let Some(subtask) = next.current_subtask.as_ref().filter(|_| popped) {
            tracing::debug!(subtask_id = %subtask.id, remaining = next.queue.len(), "subtask solved");
            ctx.emit(StreamEvent::SubtaskSolved(SolveEvent {
                subtask_id: subtask.id.get(),
                subtask: subtask.text.clone(),
                remaining: next.queue.len(),
            }))
            .await;
        }
        Ok((next, Next::Continue))
    }
}
