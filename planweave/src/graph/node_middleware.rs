//! Node middleware: wrap each node run with async logic (around pattern).
//!
//! Set via `StateGraph::with_middleware` before `compile`.

use async_trait::async_trait;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use crate::error::AgentError;

use super::Next;

/// Boxed future returned by the wrapped node call.
pub type NodeFuture<S> = Pin<Box<dyn Future<Output = Result<(S, Next), AgentError>> + Send>>;

/// The node call handed to middleware; must be called for the node to run.
pub type NodeCall<S> = Box<dyn FnOnce(S) -> NodeFuture<S> + Send>;

#[async_trait]
pub trait NodeMiddleware<S>: Send + Sync
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Wraps one node run. `inner` runs the node with the given state.
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: NodeCall<S>,
    ) -> Result<(S, Next), AgentError>;
}
