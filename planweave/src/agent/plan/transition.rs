//! Loop phases and the guarded transition taken after a solve step.
//!
//! ```text
//! Planning -> Solving -> Refining -> Solving -> ... -> Finalizing -> Done
//! ```
//!
//! Only the transition out of `Solving` has a guard; see [`after_solve`].

use serde::{Deserialize, Serialize};

use super::state::PlanState;

/// Graph node ids, one per phase that does work.
pub const PLAN_NODE: &str = "plan";
pub const SOLVE_NODE: &str = "solve";
pub const REFINE_NODE: &str = "refine";
pub const FINALIZE_NODE: &str = "finalize";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    Planning,
    Solving,
    Refining,
    Finalizing,
    Done,
}

impl LoopPhase {
    /// Node that handles this phase; `None` for `Done`.
    pub fn node_id(self) -> Option<&'static str> {
        match self {
            LoopPhase::Planning => Some(PLAN_NODE),
            LoopPhase::Solving => Some(SOLVE_NODE),
            LoopPhase::Refining => Some(REFINE_NODE),
            LoopPhase::Finalizing => Some(FINALIZE_NODE),
            LoopPhase::Done => None,
        }
    }
}

/// Phase to enter once a solve step has run.
///
/// - iteration cap reached: `Finalizing`, abandoning any pending subtasks.
/// - nothing pending and nothing solved: `Finalizing`. Refining would be a
///   no-op that never advances the iteration count.
/// - otherwise: `Refining`.
pub fn after_solve(state: &PlanState) -> LoopPhase {
    if state.iterations_exhausted() {
        LoopPhase::Finalizing
    } else if state.queue.is_empty() && state.results.is_empty() {
        LoopPhase::Finalizing
    } else {
        LoopPhase::Refining
    }
}

/// Successor of `phase` given the state produced by that phase's step.
pub fn next_phase(phase: LoopPhase, state: &PlanState) -> LoopPhase {
    match phase {
        LoopPhase::Planning => LoopPhase::Solving,
        LoopPhase::Solving => after_solve(state),
        LoopPhase::Refining => LoopPhase::Solving,
        LoopPhase::Finalizing | LoopPhase::Done => LoopPhase::Done,
    }
}
