//! Plan agent: decompose a query into subtasks, solve them one by one, and
//! let the model refine the list for a bounded number of iterations.
//!
//! ```text
//! START → plan → solve ─┬─> refine → solve ...
//!                       └─> finalize → END
//! ```
//!
//! Each step is a function from `&PlanState` to a new `PlanState`
//! ([`plan_step`], [`solve_step`], [`refine_step`], [`finalize_step`]); the
//! graph nodes wrap them and emit stream events. [`after_solve`] owns the only
//! branching decision.
//!
//! Subtasks carry a per-run [`SubtaskId`], but two rules stay textual: refine
//! drops candidates whose text is already solved, and the result store keeps one
//! entry per text (a re-solve replaces the result in place).

mod build;
mod finalize_node;
mod lifecycle;
mod parse;
mod plan_node;
mod prompt;
mod refine_node;
mod runner;
mod solve_node;
mod state;
mod transition;

pub use build::{build_default_llm, build_plan_runner, BuildRunnerError};
pub use finalize_node::{assemble_result, finalize_step, FinalizeNode, NO_RESULTS};
pub use lifecycle::{LifecycleEdge, LifecycleGraph, LifecycleNode, Stage};
pub use parse::parse_subtask_lines;
pub use plan_node::{apply_plan, plan_step, PlanNode};
pub use prompt::{build_plan_prompt, build_refine_prompt, build_solve_prompt, NO_CHANGES_SENTINEL};
pub use refine_node::{apply_refine, refine_step, RefineNode, RefineOutcome};
pub use runner::{
    build_plan_graph, run_plan_agent, PlanOptions, PlanOutcome, PlanRunError, PlanRunner,
};
pub use solve_node::{apply_solve, solve_step, SolveNode};
pub use state::{
    IterationRecord, LifecycleHistory, PlanState, ResultStore, SolvedSubtask, Subtask, SubtaskId,
    SubtaskQueue, DEFAULT_MAX_ITERATIONS,
};
pub use transition::{
    after_solve, next_phase, LoopPhase, FINALIZE_NODE, PLAN_NODE, REFINE_NODE, SOLVE_NODE,
};
