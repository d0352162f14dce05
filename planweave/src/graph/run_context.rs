//! Run context passed into nodes for streaming-aware execution.
//!
//! Holds the runnable config, optional stream sender and the selected stream
//! modes. Nodes use [`RunContext::emit`] to send events; the context drops the
//! event when its mode is not enabled or nobody is listening.

use std::collections::HashSet;
use std::fmt::Debug;

use tokio::sync::mpsc;

use crate::stream::{StreamEvent, StreamMode};

use super::RunnableConfig;

#[derive(Clone)]
pub struct RunContext<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Config for the current run (run id, recursion limit, cancellation).
    pub config: RunnableConfig,
    /// Optional sender for streaming events.
    pub stream_tx: Option<mpsc::Sender<StreamEvent<S>>>,
    /// Enabled stream modes.
    pub stream_mode: HashSet<StreamMode>,
}

impl<S> RunContext<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new(config: RunnableConfig) -> Self {
        Self {
            config,
            stream_tx: None,
            stream_mode: HashSet::new(),
        }
    }

    /// Attaches a sender and the modes it should receive.
    pub fn with_stream(
        mut self,
        tx: mpsc::Sender<StreamEvent<S>>,
        modes: impl Into<HashSet<StreamMode>>,
    ) -> Self {
        self.stream_tx = Some(tx);
        self.stream_mode = modes.into();
        self
    }

    pub fn is_streaming_mode(&self, mode: StreamMode) -> bool {
        self.stream_mode.contains(&mode)
    }

    pub fn is_cancelled(&self) -> bool {
        self.config.is_cancelled()
    }

    /// Sends `event` when a sender is attached and the event's mode is enabled.
    ///
    /// Returns `true` if the event was sent. A closed receiver is not an error.
    pub async fn emit(&self, event: StreamEvent<S>) -> bool {
        let Some(tx) = &self.stream_tx else {
            return false;
        };
        if !self.stream_mode.contains(&event.mode()) {
            return false;
        }
        tx.send(event).await.is_ok()
    }
}
