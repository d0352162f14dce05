//! Logging initialization: logs go only to a file (or are dropped), never to
//! the console, so stdout carries only the answer.
//!
//! `RUST_LOG` sets the filter (default `info`); `LOG_FILE` names the file.

use std::io::Write;
use std::sync::Mutex;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::log_format::TextWithSpanIds;

/// Installs the global subscriber. Hold the returned guard until exit so
/// buffered lines reach the file.
pub fn init() -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let filter = config::tracing_init::env_filter("info");

    match config::tracing_init::log_file_path() {
        Some(path) => {
            let (writer, guard) = config::tracing_init::file_writer(&path)?;
            let file_layer = tracing_subscriber::fmt::layer()
                .event_format(TextWithSpanIds::new())
                .with_writer(Mutex::new(StripAnsiWriter::new(writer)))
                .with_ansi(false)
                .with_filter(filter);
            tracing_subscriber::registry().with(file_layer).try_init()?;
            tracing::info!(path = %path.display(), "planweave logging to file");
            Ok(Some(guard))
        }
        None => {
            let sink_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::sink)
                .with_filter(filter);
            tracing_subscriber::registry().with(sink_layer).try_init()?;
            Ok(None)
        }
    }
}

/// Drops ANSI CSI sequences (`ESC [ ... final`) so field values that carry
/// colour codes stay readable in the file.
pub(crate) struct StripAnsiWriter<W> {
    inner: W,
    pending: Vec<u8>,
}

impl<W: Write> StripAnsiWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self {
            inner,
            pending: Vec::new(),
        }
    }

    fn flush_pending(&mut self) -> std::io::Result<()> {
        if !self.pending.is_empty() {
            self.inner.write_all(&self.pending)?;
            self.pending.clear();
        }
        Ok(())
    }
}

impl<W: Write> Write for StripAnsiWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut plain_start = 0;
        for (i, &b) in buf.iter().enumerate() {
            match self.pending.len() {
                0 if b == 0x1b => {
                    self.inner.write_all(&buf[plain_start..i])?;
                    self.pending.push(b);
                }
                0 => continue,
                1 if b == b'[' => self.pending.push(b),
                1 => {
                    // lone ESC: keep it
                    self.pending.push(b);
                    self.flush_pending()?;
                }
                _ if (0x40..=0x7e).contains(&b) => self.pending.clear(),
                n if n < 64 => self.pending.push(b),
                _ => {
                    self.pending.push(b);
                    self.flush_pending()?;
                }
            }
            if self.pending.is_empty() {
                plain_start = i + 1;
            }
        }
        if self.pending.is_empty() {
            self.inner.write_all(&buf[plain_start..])?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_pending()?;
        self.inner.flush()
    }
}
