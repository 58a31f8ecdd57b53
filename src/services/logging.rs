//! Tracing subscriber setup.
//!
//! Logs go to stderr because stdout carries the RPC protocol. `RUST_LOG`
//! overrides the configured filter; `LOG_FORMAT=json|text` overrides the
//! configured format.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::types::settings::{LogFormat, LoggingSettings};

/// Resolves the effective filter directive: `RUST_LOG` when set, else the configured one.
pub fn effective_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.filter))
}

/// Resolves the effective format: `LOG_FORMAT` when set to a known value, else the configured one.
pub fn effective_format(settings: &LoggingSettings) -> LogFormat {
    match std::env::var("LOG_FORMAT").ok().as_deref() {
        Some("json") => LogFormat::Json,
        Some("text") => LogFormat::Text,
        _ => settings.format,
    }
}

/// Installs the global subscriber.
///
/// Returns the appender guard when file logging is enabled; keep it alive for
/// the lifetime of the process so buffered lines are flushed. Calling this
/// twice is harmless: the second install is ignored.
pub fn init(settings: &LoggingSettings) -> Option<WorkerGuard> {
    let registry = tracing_subscriber::registry().with(effective_filter(settings));
    let format = effective_format(settings);

    if let Some(ref path) = settings.file {
        let path = Path::new(path);
        let dir = path.parent().unwrap_or(Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("smartmark.log");
        let appender = tracing_appender::rolling::daily(dir, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let _ = match format {
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                .try_init(),
            LogFormat::Text => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .try_init(),
        };
        Some(guard)
    } else {
        let _ = match format {
            LogFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init(),
            LogFormat::Text => registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init(),
        };
        None
    }
}
