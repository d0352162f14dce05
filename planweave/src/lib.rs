//! # planweave
//!
//! Plan, solve and refine subtasks with a language model, on a small
//! **state-in, state-out** graph runtime: one state type flows through every
//! node, and each node returns the next state plus where to go next.
//!
//! ## The loop
//!
//! A query is broken into subtasks by the model ([`plan_step`]). Subtasks are
//! answered one per step ([`solve_step`]). After each solve the model may
//! propose new subtasks ([`refine_step`]) until `max_iterations` refine cycles
//! have run, and the answers are joined into the final result
//! ([`finalize_step`]). [`after_solve`] decides between refining and finishing.
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`Next`], [`RunContext`],
//!   [`RunnableConfig`]; conditional edges, middleware, DOT export.
//! - [`agent::plan`]: [`PlanState`], the four steps and nodes, [`PlanRunner`],
//!   [`run_plan_agent`], [`LifecycleGraph`].
//! - [`llm`]: [`LlmClient`] trait, [`MockLlm`], OpenAI-compatible [`ChatOpenAI`].
//! - [`stream`]: [`StreamEvent`], [`StreamMode`].
//! - [`config`]: [`PlanBuildConfig`] from env; run config summaries.
//! - [`message`]: [`Message`] (System / User / Assistant).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use planweave::{run_plan_agent, MockLlm};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(MockLlm::with_content("Book flight\nBook hotel"));
//! let outcome = run_plan_agent(llm, "How to plan a trip to Japan?", true).await?;
//! println!("{}", outcome.final_result);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod graph;
pub mod llm;
pub mod message;
pub mod runner_common;
pub mod stream;

pub use agent::plan::{
    after_solve, build_plan_graph, build_plan_runner, finalize_step, plan_step, refine_step,
    run_plan_agent, solve_step, BuildRunnerError, LifecycleGraph, LifecycleHistory, LoopPhase,
    PlanOptions, PlanOutcome, PlanRunError, PlanRunner, PlanState, Subtask, SubtaskId,
};
pub use config::summary::{build_config_summary, ConfigSection, RunConfigSummary};
pub use config::PlanBuildConfig;
pub use error::AgentError;
pub use graph::{
    generate_dot, generate_text, CompilationError, CompiledStateGraph, Next, Node,
    NodeMiddleware, RunContext, RunnableConfig, StateGraph, END, START,
};
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MockLlm};
pub use message::Message;
pub use stream::{StreamEvent, StreamMode};
pub use tokio_util::sync::CancellationToken;
