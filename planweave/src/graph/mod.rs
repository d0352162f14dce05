//! Minimal state graph runtime: nodes, edges, conditional routing, streaming.
//!
//! The plan agent is one `StateGraph<PlanState>`; the same builder works for any
//! `S: Clone + Send + Sync + Debug`.

mod compile_error;
mod compiled;
mod conditional;
mod logging;
mod logging_middleware;
mod next;
mod node;
mod node_middleware;
mod run_context;
mod runnable_config;
mod state_graph;
mod visualization;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
pub use logging_middleware::LoggingNodeMiddleware;
pub use next::Next;
pub use node::Node;
pub use node_middleware::{NodeCall, NodeFuture, NodeMiddleware};
pub use run_context::RunContext;
pub use runnable_config::RunnableConfig;
pub use state_graph::{StateGraph, END, START};
pub use visualization::{generate_dot, generate_text};
