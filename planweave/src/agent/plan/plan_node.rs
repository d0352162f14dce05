//! Plan node: the model breaks the query into an initial subtask list.
//!
//! Resets results, iteration count and history, fills the queue and opens the
//! first iteration record. Emits `StreamEvent::PlanCreated`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::{Next, Node, RunContext, RunnableConfig};
use crate::llm::LlmClient;
use crate::stream::{PlanEvent, StreamEvent};

use super::parse::parse_subtask_lines;
use super::prompt::build_plan_prompt;
use super::state::{LifecycleHistory, PlanState, ResultStore, SubtaskQueue};
use super::transition::{next_phase, LoopPhase, PLAN_NODE};

/// Applies a plan response to `state`; the input state is left untouched.
pub fn apply_plan(state: &PlanState, response: &str) -> PlanState {
    let mut next = state.clone();
    let subtasks = next.allocate_subtasks(parse_subtask_lines(response));
    next.queue = subtasks.iter().cloned().collect::<SubtaskQueue>();
    next.results = ResultStore::new();
    next.iteration_count = 0;
    next.current_subtask = None;
    next.final_result = None;
    next.history = LifecycleHistory::new();
    next.history.open(subtasks);
    next.phase = next_phase(LoopPhase::Planning, &next);
    next
}

/// Plan step: one model call with the plan prompt.
pub async fn plan_step(llm: &dyn LlmClient, state: &PlanState) -> Result<PlanState, AgentError> {
    let response = llm.invoke_prompt(&build_plan_prompt(&state.query)).await?;
    Ok(apply_plan(state, &response))
}

pub struct PlanNode {
    llm: Arc<dyn LlmClient>,
}

impl PlanNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<PlanState> for PlanNode {
    fn id(&self) -> &str {
        PLAN_NODE
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
        let next = plan_step(self.llm.as_ref(), &state).await?;
        tracing::info!(subtasks = next.queue.len(), "plan created");
        ctx.emit(StreamEvent::PlanCreated(PlanEvent {
            subtasks: next.queue.texts().into_iter().map(String::from).collect(),
        }))
        .await;
        Ok((next, Next::Continue))
    }
}
