//! # Log Output
//!
//! Host-side `tracing` subscriber setup. Events render as
//! `[LEVEL] message key=value ...`, one per line, so a frame slip shows up
//! as `[WARN] Frame overrun: slipped by 4000 us`.

use std::fmt;

use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Event format with the level in square brackets and no timestamp or target.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketedLevel;

impl<S, N> FormatEvent<S, N> for BracketedLevel
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        write!(writer, "[{}] ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber: stderr, [`BracketedLevel`] lines, filtered
/// by `RUST_LOG` and falling back to `warn`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .event_format(BracketedLevel)
        .init();
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tracing_subscriber::fmt::MakeWriter;

    use crate::{infallible, Executive, ExecutiveConfig, Task, TaskConfig, TaskTable, VirtualClock};

    /// In-memory log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture<T>(f: impl FnOnce() -> T) -> (T, String) {
        let sink = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .event_format(BracketedLevel)
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        (out, sink.contents())
    }

    #[test]
    fn test_bracketed_level_line() {
        let ((), out) = capture(|| {
            tracing::warn!(slots = 3, "table full");
            tracing::info!("filtered out");
        });
        assert!(out.starts_with("[WARN] table full"));
        assert!(out.contains("slots=3"));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_frame_overrun_warning_text() {
        let clock = VirtualClock::new();
        let work = clock.clone();
        let table = TaskTable::new().with(
            Task::new(
                "hog",
                TaskConfig::new(Duration::from_millis(10), Duration::from_millis(2)),
                infallible(move || work.advance(Duration::from_millis(14))),
            )
            .unwrap(),
        );
        let mut exec = Executive::start(ExecutiveConfig::default(), table, clock).unwrap();

        // Body ran 0..14 ms against a 10 ms frame boundary
        let (_, out) = capture(|| exec.tick());
        let warnings: Vec<&str> = out.lines().filter(|l| l.starts_with("[WARN]")).collect();
        assert_eq!(warnings, ["[WARN] Frame overrun: slipped by 4000 us"]);
    }

    #[test]
    fn test_on_time_frame_is_silent() {
        let clock = VirtualClock::new();
        let work = clock.clone();
        let table = TaskTable::new().with(
            Task::new(
                "light",
                TaskConfig::new(Duration::from_millis(10), Duration::from_millis(2)),
                infallible(move || work.advance(Duration::from_micros(500))),
            )
            .unwrap(),
        );
        let mut exec = Executive::start(ExecutiveConfig::default(), table, clock).unwrap();

        let (_, out) = capture(|| exec.tick());
        assert_eq!(out, "");
    }
}
