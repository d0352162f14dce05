//! Middleware that reports node enter/exit around each node run.
//!
//! Installed by the plan runner when verbose output is requested.

use async_trait::async_trait;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::time::Instant;

use crate::error::AgentError;
use crate::graph::Next;

use super::{NodeCall, NodeMiddleware};

/// Logs node enter/exit with elapsed time. Writes to stderr so stdout stays
/// reserved for the final answer.
pub struct LoggingNodeMiddleware<S> {
    _phantom: PhantomData<S>,
}

impl<S> Default for LoggingNodeMiddleware<S> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<S> NodeMiddleware<S> for LoggingNodeMiddleware<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: NodeCall<S>,
    ) -> Result<(S, Next), AgentError> {
        eprintln!("[node] enter node={}", node_id);
        let started = Instant::now();
        let result = inner(state).await;
        let ms = started.elapsed().as_millis();
        match &result {
            Ok((_, next)) => eprintln!("[node] exit node={} next={:?} ms={}", node_id, next, ms),
            Err(e) => eprintln!("[node] exit node={} error={} ms={}", node_id, e, ms),
        }
        result
    }
}
