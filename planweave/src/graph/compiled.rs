//! Compiled state graph: immutable, supports invoke and stream.
//!
//! Built by `StateGraph::compile`. Runs from the first node; after each node the
//! next one comes from the conditional router, the node's `Next`, or the
//! outgoing edge. Cancellation is checked before every node, and the optional
//! recursion limit bounds the number of node executions.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::AgentError;
use crate::stream::{StreamEvent, StreamMode};

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state, log_route,
};
use super::node_middleware::{NodeCall, NodeFuture, NodeMiddleware};
use super::state_graph::END;
use super::{Next, NextEntry, Node, RunContext, RunnableConfig};

/// Executable graph. Cheap to clone; nodes are shared.
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) first_node_id: String,
    /// Linear node order for graphs without conditional edges; otherwise just the entry node.
    pub(super) edge_order: Vec<String>,
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) middleware: Option<Arc<dyn NodeMiddleware<S>>>,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Registered node ids, sorted.
    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    async fn execute_node(
        &self,
        node_id: &str,
        node: Arc<dyn Node<S>>,
        state: S,
        run_ctx: &RunContext<S>,
    ) -> Result<(S, Next), AgentError> {
        match &self.middleware {
            Some(middleware) => {
                let ctx = run_ctx.clone();
                let inner: NodeCall<S> = Box::new(move |s: S| -> NodeFuture<S> {
                    Box::pin(async move { node.run_with_context(s, &ctx).await })
                });
                middleware.around_run(node_id, state, inner).await
            }
            None => node.run_with_context(state, run_ctx).await,
        }
    }

    fn resolve_next(&self, current_id: &str, state: &S, next: Next) -> Option<String> {
        match self.next_map.get(current_id) {
            Some(NextEntry::Conditional(router)) => Some(router.resolve_next(state)),
            entry => match next {
                Next::End => None,
                Next::Node(id) => Some(id),
                Next::Continue => match entry {
                    Some(NextEntry::Unconditional(id)) => Some(id.clone()),
                    _ => {
                        let pos = self.edge_order.iter().position(|x| x == current_id)?;
                        self.edge_order.get(pos + 1).cloned()
                    }
                },
            },
        }
    }

    /// Shared run loop of `invoke_with_context` and `stream`.
    async fn run_loop(&self, state: &mut S, run_ctx: &RunContext<S>) -> Result<(), AgentError> {
        let run_id = run_ctx.config.run_id.as_deref();
        let limit = run_ctx.config.recursion_limit;
        let mut current_id = self.first_node_id.clone();
        let mut steps = 0usize;
        log_graph_start(run_id);

        loop {
            if run_ctx.is_cancelled() {
                tracing::info!(node_id = %current_id, steps, "run cancelled before node");
                return Err(AgentError::Cancelled);
            }
            if let Some(limit) = limit {
                if steps >= limit {
                    let err = AgentError::RecursionLimit(limit);
                    log_graph_error(&err);
                    return Err(err);
                }
            }
            let node = self.nodes.get(&current_id).cloned().ok_or_else(|| {
                AgentError::ExecutionFailed(format!("node not found: {}", current_id))
            })?;
            steps += 1;

            log_node_start(&current_id);
            log_node_state(&current_id, state);
            run_ctx
                .emit(StreamEvent::TaskStart {
                    node_id: current_id.clone(),
                })
                .await;

            let (new_state, next) = match self
                .execute_node(&current_id, node, state.clone(), run_ctx)
                .await
            {
                Ok(out) => out,
                Err(e) => {
                    run_ctx
                        .emit(StreamEvent::TaskEnd {
                            node_id: current_id.clone(),
                            result: Err(e.to_string()),
                        })
                        .await;
                    log_graph_error(&e);
                    return Err(e);
                }
            };
            run_ctx
                .emit(StreamEvent::TaskEnd {
                    node_id: current_id.clone(),
                    result: Ok(()),
                })
                .await;
            log_node_complete(&current_id, &next);

            *state = new_state;
            if run_ctx.is_streaming_mode(StreamMode::Values) {
                run_ctx.emit(StreamEvent::Values(state.clone())).await;
            }
            if run_ctx.is_streaming_mode(StreamMode::Updates) {
                run_ctx
                    .emit(StreamEvent::Updates {
                        node_id: current_id.clone(),
                        state: state.clone(),
                    })
                    .await;
            }

            match self.resolve_next(&current_id, state, next) {
                Some(id) if id != END => {
                    log_route(&current_id, &id);
                    current_id = id;
                }
                _ => {
                    log_graph_complete(run_id, steps);
                    return Ok(());
                }
            }
        }
    }

    /// Runs the graph to completion and returns the final state.
    ///
    /// - `Next::Continue`: follow the outgoing edge (or linear order); end if none.
    /// - `Next::Node(id)`: run that node next.
    /// - `Next::End`: stop.
    ///
    /// Nodes with conditional edges are routed by their router regardless of `Next`.
    pub async fn invoke(&self, state: S, config: Option<RunnableConfig>) -> Result<S, AgentError> {
        self.invoke_with_context(state, RunContext::new(config.unwrap_or_default()))
            .await
    }

    /// Runs the graph with a caller-built context (stream sender, modes, config).
    pub async fn invoke_with_context(
        &self,
        state: S,
        run_ctx: RunContext<S>,
    ) -> Result<S, AgentError> {
        if !self.nodes.contains_key(&self.first_node_id) {
            return Err(AgentError::ExecutionFailed("empty graph".into()));
        }
        let mut state = state;
        self.run_loop(&mut state, &run_ctx).await?;
        Ok(state)
    }

    /// Streams a run on a spawned task. The stream ends when the run does; a
    /// failing node shows up as a `TaskEnd` with `Err` when `Tasks` is enabled.
    pub fn stream(
        &self,
        state: S,
        config: Option<RunnableConfig>,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> ReceiverStream<StreamEvent<S>> {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();
        let run_ctx = RunContext::new(config.unwrap_or_default()).with_stream(tx, stream_mode);

        tokio::spawn(async move {
            if let Err(e) = graph.invoke_with_context(state, run_ctx).await {
                tracing::debug!(error = %e, "streamed run ended with error");
            }
        });

        ReceiverStream::new(rx)
    }
}
