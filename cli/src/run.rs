//! Run orchestration: build the runner from env (or offline), stream plan
//! progress to stderr, and return the outcome.

use std::collections::HashSet;
use std::sync::Arc;

use planweave::stream::{PlanEvent, RefineEvent, SolveEvent};
use planweave::{
    build_config_summary, build_plan_runner, BuildRunnerError, CancellationToken, LlmClient,
    PlanBuildConfig, PlanOutcome, PlanRunError, PlanState, RunnableConfig, StreamEvent,
    StreamMode,
};

use crate::offline::OfflineLlm;

/// Query used when none is given on the command line.
pub const DEFAULT_QUERY: &str = "How to plan a trip to Japan?";

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Please enter a query.")]
    EmptyQuery,
    #[error(transparent)]
    Build(#[from] BuildRunnerError),
    #[error(transparent)]
    Run(#[from] PlanRunError),
}

impl RunError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunError::Run(e) if e.is_cancelled())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub query: String,
    /// Overrides `PLAN_MAX_ITERATIONS`.
    pub max_iterations: Option<u32>,
    /// Overrides `PLAN_MODEL` / `OPENAI_MODEL`.
    pub model: Option<String>,
    /// Node enter/exit, config summary and per-event progress on stderr.
    pub verbose: bool,
    /// Use [`OfflineLlm`] instead of the configured endpoint.
    pub offline: bool,
    /// Keep the lifecycle history in the outcome.
    pub history: bool,
}

impl RunOptions {
    /// Env config with the command-line overrides applied.
    pub fn build_config(&self, base: PlanBuildConfig) -> PlanBuildConfig {
        let config = match &self.model {
            Some(model) => base.with_model(model.clone()),
            None => base,
        };
        match self.max_iterations {
            Some(n) => config.with_max_iterations(n),
            None => config,
        }
    }
}

/// One line of stderr progress for a plan event; `None` for generic events.
pub fn progress_line(event: &StreamEvent<PlanState>) -> Option<String> {
    match event {
        StreamEvent::PlanCreated(PlanEvent { subtasks }) => Some(format!(
            "plan: {} subtask(s){}",
            subtasks.len(),
            subtasks
                .iter()
                .map(|s| format!("\n  - {}", s))
                .collect::<String>()
        )),
        StreamEvent::SubtaskSolved(SolveEvent {
            subtask_id,
            subtask,
            remaining,
        }) => Some(format!(
            "solved #{} {} ({} pending)",
            subtask_id, subtask, remaining
        )),
        StreamEvent::Refined(RefineEvent {
            iteration,
            added,
            no_changes,
        }) => Some(if *no_changes {
            format!("refine {}: no changes", iteration)
        } else {
            format!("refine {}: {} new subtask(s)", iteration, added.len())
        }),
        StreamEvent::Finalized { solved_count } => {
            Some(format!("finalized with {} result(s)", solved_count))
        }
        _ => None,
    }
}

/// Runs one query to completion, honouring `cancel` between steps.
///
/// `llm` overrides both the configured and the offline client (tests).
pub async fn run_query(
    opts: &RunOptions,
    base: PlanBuildConfig,
    llm: Option<Arc<dyn LlmClient>>,
    cancel: CancellationToken,
) -> Result<PlanOutcome, RunError> {
    if opts.query.trim().is_empty() {
        return Err(RunError::EmptyQuery);
    }

    let config = opts.build_config(base);
    let llm = llm.or_else(|| {
        opts.offline
            .then(|| Arc::new(OfflineLlm) as Arc<dyn LlmClient>)
    });
    if opts.verbose {
        build_config_summary(&config).print_to_stderr();
    }
    let runner = build_plan_runner(&config, llm, opts.verbose)?;

    let run_config = RunnableConfig::default().with_cancellation(cancel);
    let modes: HashSet<StreamMode> = [StreamMode::Custom].into_iter().collect();
    let verbose = opts.verbose;
    let state = runner
        .stream_with_modes(&opts.query, run_config, modes, |event| {
            if verbose {
                if let Some(line) = progress_line(&event) {
                    eprintln!("{}", line);
                }
            }
        })
        .await?;
    tracing::info!(
        iterations = state.iteration_count,
        results = state.results.len(),
        "query finished"
    );
    Ok(PlanOutcome::from_state(state, opts.history))
}
