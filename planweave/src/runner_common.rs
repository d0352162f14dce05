//! Streaming execution shared by runners.
//!
//! Drives `invoke_with_context` and the event channel side by side on the
//! caller's task, so `on_event` need not be `Send` and the run's error is
//! returned as-is instead of being swallowed by a spawned task.

use std::collections::HashSet;
use std::fmt::Debug;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::error::AgentError;
use crate::graph::{CompiledStateGraph, RunContext, RunnableConfig};
use crate::stream::{StreamEvent, StreamMode};

/// Runs `compiled` to completion, calling `on_event` for every event in `modes`.
///
/// Events still buffered when the run finishes are delivered before returning.
pub async fn run_stream_with_config<S, F>(
    compiled: &CompiledStateGraph<S>,
    initial_state: S,
    run_config: RunnableConfig,
    modes: HashSet<StreamMode>,
    mut on_event: F,
) -> Result<S, AgentError>
where
    S: Clone + Send + Sync + Debug + 'static,
    F: FnMut(StreamEvent<S>),
{
    let (tx, rx) = mpsc::channel(128);
    let run_ctx = RunContext::new(run_config).with_stream(tx, modes);
    let mut events = ReceiverStream::new(rx);

    let run = compiled.invoke_with_context(initial_state, run_ctx);
    tokio::pin!(run);
    let result = loop {
        tokio::select! {
            Some(event) = events.next() => on_event(event),
            result = &mut run => break result,
        }
    };
    while let Some(event) = events.next().await {
        on_event(event);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::graph::{Next, Node, StateGraph, END, START};

    struct Inc;

    #[async_trait]
    impl Node<i32> for Inc {
        fn id(&self) -> &str {
            "inc"
        }
        async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
            Ok((state + 1, Next::Continue))
        }
    }

    struct Fail;

    #[async_trait]
    impl Node<i32> for Fail {
        fn id(&self) -> &str {
            "fail"
        }
        async fn run(&self, _state: i32) -> Result<(i32, Next), AgentError> {
            Err(AgentError::ModelInvocation("down".into()))
        }
    }

    #[tokio::test]
    async fn returns_final_state_and_delivers_events() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("inc", Arc::new(Inc));
        graph.add_edge(START, "inc");
        graph.add_edge("inc", END);
        let compiled = graph.compile().unwrap();

        let mut values = Vec::new();
        let out = run_stream_with_config(
            &compiled,
            1,
            RunnableConfig::default(),
            HashSet::from([StreamMode::Values]),
            |ev| {
                if let StreamEvent::Values(v) = ev {
                    values.push(v);
                }
            },
        )
        .await
        .unwrap();
        assert_eq!(out, 2);
        assert_eq!(values, vec![2]);
    }

    /// **Scenario**: the node error comes back to the caller.
    #[tokio::test]
    async fn propagates_run_error() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("fail", Arc::new(Fail));
        graph.add_edge(START, "fail");
        graph.add_edge("fail", END);
        let compiled = graph.compile().unwrap();

        let mut kinds = Vec::new();
        let err = run_stream_with_config(
            &compiled,
            0,
            RunnableConfig::default(),
            HashSet::from([StreamMode::Tasks]),
            |ev| kinds.push(ev.kind()),
        )
        .await
        .unwrap_err();
        assert!(err.is_model_invocation());
        assert_eq!(kinds, vec!["task_start", "task_end"]);
    }
}
