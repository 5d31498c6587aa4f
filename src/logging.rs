//! Structured logging for devstart
//!
//! Progress lines meant for the operator are printed with the `[devstart]`
//! prefix (see [`crate::cli_utils`]). Everything else goes through `tracing`
//! with structured fields so a run can be inspected with `RUST_LOG=debug`.
//!
//! # Field conventions
//!
//! - `step`: the pipeline step ("clean", "seed", "serve")
//! - `program`: the program being spawned
//! - `path`: a cleanup path, relative to the project root
//! - `exit_code`: exit code of a spawned program
//! - `duration_ms`: wall-clock duration of a step
//! - `files`: number of files removed with a cache directory
//!
//! ```rust
//! use tracing::debug;
//!
//! debug!(step = "clean", path = "__pycache__", files = 12, "removed");
//! ```

use std::{fmt as std_fmt, io};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{
    fmt::{self, format::Writer},
    prelude::*,
    EnvFilter,
};

/// Formatter that prints `LEVEL(devstart)` instead of the module path
struct DevstartFormatter {
    with_ansi: bool,
}

impl<S, N> FormatEvent<S, N> for DevstartFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std_fmt::Result {
        let meta = event.metadata();

        write!(
            writer,
            "{} ",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f")
        )?;

        if self.with_ansi {
            let level_style = match *meta.level() {
                tracing::Level::ERROR => "\x1b[31m",
                tracing::Level::WARN => "\x1b[33m",
                tracing::Level::INFO => "\x1b[32m",
                tracing::Level::DEBUG => "\x1b[34m",
                tracing::Level::TRACE => "\x1b[35m",
            };
            write!(writer, "{}{:5}(devstart)\x1b[0m: ", level_style, meta.level())?;
        } else {
            write!(writer, "{:5}(devstart): ", meta.level())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Colored, human-readable (default on a developer machine)
    Pretty,
    /// Same layout without ANSI colors (default when `CI` is set)
    Compact,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Read `DEVSTART_LOG_FORMAT`, falling back on `CI` detection
    pub fn from_env() -> Self {
        match std::env::var("DEVSTART_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            "compact" => Self::Compact,
            "pretty" => Self::Pretty,
            _ => {
                if std::env::var("CI").is_ok() {
                    Self::Compact
                } else {
                    Self::Pretty
                }
            }
        }
    }
}

/// Install the global tracing subscriber.
///
/// # Environment Variables
///
/// - `RUST_LOG`: log filter (default `info`)
/// - `DEVSTART_LOG_FORMAT`: `pretty`, `compact` or `json`
/// - `CI`: if set, defaults to `compact`
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match LogFormat::from_env() {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .event_format(DevstartFormatter { with_ansi: true })
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .event_format(DevstartFormatter { with_ansi: false })
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_ansi(false)
                    .with_writer(io::stderr)
                    .json(),
            )
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("devstart: logging already initialized: {}", e);
    }
}

/// Step names used in the `step` field
pub mod steps {
    pub const CLEAN: &str = "clean";
    pub const SEED: &str = "seed";
    pub const SERVE: &str = "serve";
}
