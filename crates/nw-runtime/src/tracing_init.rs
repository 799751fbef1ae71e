use std::fmt::{self as stdfmt, Write as _};
use std::path::Path;

use anyhow::Result;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use nw_config::{LogFormat, LoggingConfig};

// ---------------------------------------------------------------------------
// DomainFormat — promotes the `domain` field to a `[domain]` prefix
// ---------------------------------------------------------------------------

/// Event formatter that renders the `domain` field injected by the
/// `nw_*!` macros as a prominent `[domain]` prefix instead of burying it
/// among the key=value pairs:
///
/// ```text
/// 2026-02-16T09:00:00Z  INFO [sweep] sweep emitted alerts users=4 alerts=2
/// ```
///
/// Events without a `domain` field (e.g. from dependencies) render without
/// the prefix. Colouring adapts to whether the writer supports ANSI.
struct DomainFormat {
    timer: SystemTime,
}

impl DomainFormat {
    fn new() -> Self {
        Self { timer: SystemTime }
    }
}

impl<S, N> FormatEvent<S, N> for DomainFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> fmt::FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: fmt::format::Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        let ansi = writer.has_ansi_escapes();

        if ansi {
            write!(writer, "\x1b[2m")?;
        }
        if self.timer.format_time(&mut writer).is_err() {
            write!(writer, "<unknown time>")?;
        }
        if ansi {
            write!(writer, "\x1b[0m")?;
        }

        let level = *event.metadata().level();
        if ansi {
            let color = match level {
                Level::ERROR => "31",
                Level::WARN => "33",
                Level::INFO => "32",
                Level::DEBUG => "34",
                Level::TRACE => "35",
            };
            write!(writer, " \x1b[{color}m{level:>5}\x1b[0m ")?;
        } else {
            write!(writer, " {level:>5} ")?;
        }

        let mut fields = FieldSplitter::default();
        event.record(&mut fields);

        if let Some(ref domain) = fields.domain {
            if ansi {
                write!(writer, "\x1b[1;36m[{domain}]\x1b[0m ")?;
            } else {
                write!(writer, "[{domain}] ")?;
            }
        }

        write!(writer, "{}", fields.message)?;

        if !fields.rest.is_empty() {
            if ansi {
                write!(writer, " \x1b[3m{}\x1b[0m", fields.rest)?;
            } else {
                write!(writer, " {}", fields.rest)?;
            }
        }

        writeln!(writer)
    }
}

// ---------------------------------------------------------------------------
// FieldSplitter — separates domain and message from the other fields
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FieldSplitter {
    domain: Option<String>,
    message: String,
    rest: String,
}

impl FieldSplitter {
    fn sep(&mut self) {
        if !self.rest.is_empty() {
            self.rest.push(' ');
        }
    }

    fn push_pair(&mut self, name: &str, value: impl stdfmt::Display) {
        self.sep();
        write!(&mut self.rest, "{name}={value}").ok();
    }
}

impl Visit for FieldSplitter {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "domain" => self.domain = Some(value.to_string()),
            "message" => self.message = value.to_string(),
            name => {
                self.sep();
                write!(&mut self.rest, "{name}={value:?}").ok();
            }
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn stdfmt::Debug) {
        match field.name() {
            "domain" => {
                let raw = format!("{value:?}");
                self.domain = Some(raw.trim_matches('"').to_string());
            }
            "message" => {
                write!(&mut self.message, "{value:?}").ok();
            }
            name => {
                self.sep();
                write!(&mut self.rest, "{name}={value:?}").ok();
            }
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push_pair(field.name(), value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push_pair(field.name(), value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push_pair(field.name(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push_pair(field.name(), value);
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Initialise the `tracing` subscriber stack from [`LoggingConfig`].
///
/// Returns an optional [`WorkerGuard`] that must be held until the process
/// exits — dropping it flushes and closes the non-blocking file writer.
///
/// Precedence: a `RUST_LOG` env-var overrides the config-driven directives.
pub fn init_tracing(config: &LoggingConfig, base_dir: &Path) -> Result<Option<WorkerGuard>> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let mut directives = config.level.clone();
        for (module, level) in &config.modules {
            directives.push(',');
            directives.push_str(module);
            directives.push('=');
            directives.push_str(level);
        }
        EnvFilter::try_new(&directives)
            .map_err(|e| anyhow::anyhow!("invalid log filter '{directives}': {e}"))?
    };

    let is_json = config.format == LogFormat::Json;

    let mut guard: Option<WorkerGuard> = None;
    let file_writer = match config.file {
        Some(ref file_path) => {
            let resolved = if file_path.is_relative() {
                base_dir.join(file_path)
            } else {
                file_path.clone()
            };
            if let Some(parent) = resolved.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file_name = resolved
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("log file path has no file name"))?
                .to_os_string();
            let dir = resolved
                .parent()
                .ok_or_else(|| anyhow::anyhow!("log file path has no parent directory"))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, file_guard) = tracing_appender::non_blocking(appender);
            guard = Some(file_guard);
            Some(non_blocking)
        }
        None => None,
    };

    match (is_json, file_writer) {
        (true, Some(non_blocking)) => {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_target(false)
                        .with_writer(std::io::stderr)
                        .with_filter(filter),
                )
                .with(
                    fmt::layer()
                        .json()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(non_blocking),
                )
                .init();
        }
        (true, None) => {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_target(false)
                        .with_writer(std::io::stderr)
                        .with_filter(filter),
                )
                .init();
        }
        (false, Some(non_blocking)) => {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .event_format(DomainFormat::new())
                        .with_writer(std::io::stderr)
                        .with_filter(filter),
                )
                .with(
                    fmt::layer()
                        .event_format(DomainFormat::new())
                        .with_ansi(false)
                        .with_writer(non_blocking),
                )
                .init();
        }
        (false, None) => {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .event_format(DomainFormat::new())
                        .with_writer(std::io::stderr)
                        .with_filter(filter),
                )
                .init();
        }
    }

    Ok(guard)
}
