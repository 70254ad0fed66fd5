use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// One line per event: local time, level, source location, fields. Only
/// warnings and errors are highlighted.
struct LocalFmt;

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let level = *meta.level();
        let highlight = writer.has_ansi_escapes() && level <= Level::WARN;

        write!(writer, "{} ", Local::now().format("%H:%M:%S%.3f"))?;
        if highlight {
            write!(writer, "\x1b[1;31m{level:>5}\x1b[0m ")?;
        } else {
            write!(writer, "{level:>5} ")?;
        }

        // `rates-core/src/composition.rs` → `rates-core/composition.rs`
        if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
            write!(writer, "{}:{line} ", file.replacen("src/", "", 1))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn make_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initializes logging. Call once at startup.
///
/// - Stderr: colored when attached to a terminal, so stdout stays clean for
///   the table.
/// - File: plain records appended to `log_file`, if given.
/// - Level: INFO by default, or overridden by the RUST_LOG env var.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let file = log_file
        .map(|path| {
            File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file '{}'", path.display()))
        })
        .transpose()?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    let file_layer = file.map(|file| {
        tracing_subscriber::fmt::layer()
            .event_format(LocalFmt)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(make_filter())
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("logging already initialized")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tracing::warn;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn plain_line_has_level_location_and_fields() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .event_format(LocalFmt)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || warn!(year = 2018, "missing tables"));

        let line = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(line.contains(" WARN "), "{line}");
        assert!(line.contains("logging.rs:"), "{line}");
        assert!(!line.contains("src/"), "{line}");
        assert!(line.ends_with("missing tables year=2018\n"), "{line}");
        assert!(!line.contains('\x1b'), "{line}");
    }
}
