//! Process-wide logger.
//!
//! # Sinks
//!
//! - **File** - JSON lines in `<LOG_DIR>/learnify-backend-<DD-MM-YYYY>.log`,
//!   rotated daily or at 40 MiB, gzip-archived, kept for 14 days
//!   (see [`rolling`])
//! - **Console** - human-readable lines, disabled when `NODE_ENV=production`
//!
//! # Example Logs
//!
//! ```text
//! // file
//! {"timestamp":"19-10-2026-14:03:11","level":"INFO","message":"IP: 127.0.0.1 GET /api/health status: 200 length: 15 bytes 0.284 ms"}
//! // console
//! 14:03:11  INFO IP: 127.0.0.1 GET /api/health status: 200 length: 15 bytes 0.284 ms
//! ```

pub mod rolling;

use crate::api::middleware::catch_panic::panic_message;
use crate::config::Config;
use anyhow::{Context, Result};
use rolling::{RollingFile, RotationPolicy};
use std::backtrace::Backtrace;
use tracing::Subscriber;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Prefix of every log file name.
pub const LOG_FILE_PREFIX: &str = "learnify-backend";

/// Timestamp format of file records.
pub const FILE_TIME_FORMAT: &str = "%d-%m-%Y-%H:%M:%S";

/// Timestamp format of console lines.
pub const CONSOLE_TIME_FORMAT: &str = "%H:%M:%S";

/// Installs the global subscriber and the panic hook.
///
/// # Errors
///
/// Returns an error if:
/// - `RUST_LOG` directives cannot be parsed
/// - the log directory cannot be created or the log file opened
/// - a global subscriber is already installed
pub fn init(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)
        .with_context(|| format!("Invalid RUST_LOG directives '{}'", config.log_level))?;

    let file = RollingFile::new(RotationPolicy::daily(&config.log_dir, LOG_FILE_PREFIX))
        .with_context(|| format!("Failed to open log directory {}", config.log_dir.display()))?;

    let console_layer = (!config.is_production()).then(|| {
        fmt::layer()
            .with_target(false)
            .with_timer(ChronoLocal::new(CONSOLE_TIME_FORMAT.to_string()))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer(file))
        .with(console_layer)
        .try_init()
        .context("Failed to install the global logger")?;

    install_panic_hook();

    Ok(())
}

/// JSON lines sink: `timestamp`, `level`, `message` and event fields.
pub fn file_layer<S>(file: RollingFile) -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_target(false)
        .with_timer(ChronoLocal::new(FILE_TIME_FORMAT.to_string()))
        .with_writer(file)
}

/// Routes panics through the logger with their stack trace.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let backtrace = Backtrace::force_capture();
        let location = info
            .location()
            .map(|l| l.to_string())
            .unwrap_or_else(|| "unknown location".to_string());

        tracing::error!(
            "Panic at {location}: {}\n{backtrace}",
            panic_message(info.payload())
        );
    }));
}
