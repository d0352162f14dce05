//! Plain-text event formatter that tags each line with the innermost span
//! name and the root/leaf span ids.
//!
//! A plan run is one `plan_run` span, so every line of a run shares a
//! `trace_id` and can be grepped out of a shared log file.

use std::fmt;

use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

/// `TIMESTAMP LEVEL [span trace_id=R span_id=S] target: fields`
///
/// The bracket is omitted for events outside any span.
#[derive(Default)]
pub struct TextWithSpanIds {
    timer: SystemTime,
}

impl TextWithSpanIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S, N> FormatEvent<S, N> for TextWithSpanIds
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        self.timer.format_time(&mut writer)?;
        write!(writer, " {}", event.metadata().level())?;

        if let Some(span) = ctx.lookup_current() {
            let span_id = span.id().into_u64();
            let trace_id = span
                .scope()
                .from_root()
                .next()
                .map_or(span_id, |root| root.id().into_u64());
            write!(
                writer,
                " [{} trace_id={} span_id={}]",
                span.name(),
                trace_id,
                span_id
            )?;
        }

        write!(writer, " {}: ", event.metadata().target())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Clone)]
    struct VecWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for VecWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let sink = Arc::new(Mutex::new(Vec::<u8>::new()));
        let writer = {
            let sink = Arc::clone(&sink);
            move || VecWriter(Arc::clone(&sink))
        };
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .event_format(TextWithSpanIds::new())
                .with_writer(writer)
                .with_ansi(false),
        );
        tracing::subscriber::with_default(subscriber, f);
        let bytes = sink.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn event_in_span_is_tagged_with_span_name_and_ids() {
        let output = capture(|| {
            let span = tracing::info_span!("plan_run", run_id = "r1");
            let _guard = span.enter();
            tracing::info!(subtasks = 2, "plan created");
        });
        assert!(output.contains(" INFO [plan_run trace_id="), "{}", output);
        assert!(output.contains("span_id="), "{}", output);
        assert!(output.contains("plan created"), "{}", output);
        assert!(output.contains("subtasks=2"), "{}", output);
    }

    #[test]
    fn event_outside_span_has_no_bracket() {
        let output = capture(|| tracing::warn!("standalone"));
        assert!(output.contains(" WARN "), "{}", output);
        assert!(!output.contains("trace_id"), "{}", output);
    }
}
