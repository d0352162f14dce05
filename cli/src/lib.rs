//! planweave CLI library: option handling, run orchestration and output
//! rendering for the `planweave` binary.
//!
//! Builds a [`PlanRunner`](planweave::PlanRunner) from the environment (or the
//! offline client), streams progress to stderr and renders the outcome as
//! text, JSON or a DOT lifecycle graph.

pub mod offline;
pub mod output;
pub mod run;

pub use offline::OfflineLlm;
pub use output::{render_outcome, render_topology, write_output, OutputFormat};
pub use run::{progress_line, run_query, RunError, RunOptions, DEFAULT_QUERY};
