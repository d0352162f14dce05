//! Plan runner: graph construction, initial state, invoke and stream.
//!
//! Graph: START → plan → solve → [after_solve] → refine | finalize;
//! refine → solve; finalize → END.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::Instrument;

use crate::error::AgentError;
use crate::graph::{
    CompilationError, CompiledStateGraph, LoggingNodeMiddleware, RunnableConfig, StateGraph, END,
    START,
};
use crate::llm::LlmClient;
use crate::runner_common;
use crate::stream::{StreamEvent, StreamMode};

use super::finalize_node::{assemble_result, FinalizeNode};
use super::plan_node::PlanNode;
use super::refine_node::RefineNode;
use super::solve_node::SolveNode;
use super::state::{LifecycleHistory, PlanState, DEFAULT_MAX_ITERATIONS};
use super::transition::{FINALIZE_NODE, PLAN_NODE, REFINE_NODE, SOLVE_NODE};

/// Error type for PlanRunner operations.
#[derive(Debug, thiserror::Error)]
pub enum PlanRunError {
    #[error("compilation failed: {0}")]
    Compilation(#[from] CompilationError),
    #[error("execution failed: {0}")]
    Execution(#[from] AgentError),
}

impl PlanRunError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PlanRunError::Execution(AgentError::Cancelled))
    }
}

/// Knobs for one runner.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Cap on refine cycles.
    pub max_iterations: u32,
    /// Print node enter/exit to stderr.
    pub verbose: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            verbose: false,
        }
    }
}

/// Final answer and, when requested, the lifecycle history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanOutcome {
    pub final_result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<LifecycleHistory>,
}

impl PlanOutcome {
    pub fn from_state(state: PlanState, return_history: bool) -> Self {
        let final_result = state
            .final_result
            .clone()
            .unwrap_or_else(|| assemble_result(&state.results));
        Self {
            final_result,
            history: return_history.then_some(state.history),
        }
    }
}

/// Router for the solve node: the phase chosen by `after_solve`.
fn route_after_solve(state: &PlanState) -> String {
    state.phase.node_id().unwrap_or(END).to_string()
}

/// Builds and compiles the plan/solve/refine/finalize graph.
pub fn build_plan_graph(
    llm: Arc<dyn LlmClient>,
    verbose: bool,
) -> Result<CompiledStateGraph<PlanState>, CompilationError> {
    let path_map: HashMap<String, String> = [
        (REFINE_NODE.to_string(), REFINE_NODE.to_string()),
        (FINALIZE_NODE.to_string(), FINALIZE_NODE.to_string()),
    ]
    .into_iter()
    .collect();

    let mut graph = StateGraph::<PlanState>::new();
    graph
        .add_node(PLAN_NODE, Arc::new(PlanNode::new(Arc::clone(&llm))))
        .add_node(SOLVE_NODE, Arc::new(SolveNode::new(Arc::clone(&llm))))
        .add_node(REFINE_NODE, Arc::new(RefineNode::new(llm)))
        .add_node(FINALIZE_NODE, Arc::new(FinalizeNode))
        .add_edge(START, PLAN_NODE)
        .add_edge(PLAN_NODE, SOLVE_NODE)
        .add_conditional_edges(SOLVE_NODE, Arc::new(route_after_solve), Some(path_map))
        .add_edge(REFINE_NODE, SOLVE_NODE)
        .add_edge(FINALIZE_NODE, END);

    let graph = if verbose {
        graph.with_middleware(Arc::new(LoggingNodeMiddleware::<PlanState>::default()))
    } else {
        graph
    };
    graph.compile()
}

/// Plan agent runner: owns the compiled graph.
pub struct PlanRunner {
    compiled: CompiledStateGraph<PlanState>,
    options: PlanOptions,
}

impl PlanRunner {
    pub fn new(llm: Arc<dyn LlmClient>, options: PlanOptions) -> Result<Self, CompilationError> {
        let compiled = build_plan_graph(llm, options.verbose)?;
        Ok(Self { compiled, options })
    }

    pub fn options(&self) -> &PlanOptions {
        &self.options
    }

    /// The compiled loop, for topology rendering.
    pub fn graph(&self) -> &CompiledStateGraph<PlanState> {
        &self.compiled
    }

    pub fn initial_state(&self, query: &str) -> PlanState {
        PlanState::new(query, self.options.max_iterations)
    }

    pub async fn invoke(&self, query: &str) -> Result<PlanState, PlanRunError> {
        self.invoke_with_config(query, RunnableConfig::default())
            .await
    }

    pub async fn invoke_with_config(
        &self,
        query: &str,
        config: RunnableConfig,
    ) -> Result<PlanState, PlanRunError> {
        let config = with_run_id(config);
        let span = run_span(&config);
        let state = async {
            tracing::info!(
                query_len = query.len(),
                max_iterations = self.options.max_iterations,
                "plan run start"
            );
            self.compiled
                .invoke(self.initial_state(query), Some(config))
                .await
        }
        .instrument(span)
        .await?;
        Ok(state)
    }

    /// Streams every event kind to `on_event`; returns the final state.
    pub async fn stream_with_config<F>(
        &self,
        query: &str,
        config: RunnableConfig,
        on_event: F,
    ) -> Result<PlanState, PlanRunError>
    where
        F: FnMut(StreamEvent<PlanState>),
    {
        self.stream_with_modes(query, config, StreamMode::all(), on_event)
            .await
    }

    /// Like [`stream_with_config`](Self::stream_with_config) with a chosen set of modes.
    pub async fn stream_with_modes<F>(
        &self,
        query: &str,
        config: RunnableConfig,
        modes: HashSet<StreamMode>,
        on_event: F,
    ) -> Result<PlanState, PlanRunError>
    where
        F: FnMut(StreamEvent<PlanState>),
    {
        let config = with_run_id(config);
        let span = run_span(&config);
        let state = runner_common::run_stream_with_config(
            &self.compiled,
            self.initial_state(query),
            config,
            modes,
            on_event,
        )
        .instrument(span)
        .await?;
        Ok(state)
    }
}

fn run_span(config: &RunnableConfig) -> tracing::Span {
    tracing::info_span!(
        "plan_run",
        run_id = config.run_id.as_deref().unwrap_or("-")
    )
}

fn with_run_id(mut config: RunnableConfig) -> RunnableConfig {
    if config.run_id.is_none() {
        config.run_id = Some(uuid::Uuid::new_v4().to_string());
    }
    config
}

/// One-shot entry point: run the loop for `query` with default options.
///
/// Empty queries are forwarded to the model as-is.
pub async fn run_plan_agent(
    llm: Arc<dyn LlmClient>,
    query: &str,
    return_history: bool,
) -> Result<PlanOutcome, PlanRunError> {
    let runner = PlanRunner::new(llm, PlanOptions::default())?;
    let state = runner.invoke(query).await?;
    Ok(PlanOutcome::from_state(state, return_history))
}
