//! Tracing setup and log routing.
//!
//! Events are written to stdout through a compact formatter and, when a writer
//! can be prepared, to a log file as well. `PAPER_DIGEST_LOG_FILE` overrides the
//! file destination; without it logs land in `logs/paper-digest.log`. File
//! output goes through a non‑blocking writer so disk stalls never back up a
//! digest run.
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global tracing subscriber.
///
/// Filtering follows `RUST_LOG` and defaults to `info`. The file layer is
/// dropped when no writer could be prepared; its worker guard is parked in a
/// `OnceLock` so buffered events keep flushing for the process lifetime.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = file_writer().map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .init();
}

/// Prepare the non‑blocking file writer, or `None` when the destination is unusable.
fn file_writer() -> Option<NonBlocking> {
    let (writer, guard) = if let Ok(path) = std::env::var("PAPER_DIGEST_LOG_FILE") {
        let file = match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(err) => {
                eprintln!("Failed to open log file {path}: {err}");
                return None;
            }
        };
        tracing_appender::non_blocking(file)
    } else {
        if let Err(err) = std::fs::create_dir_all("logs") {
            eprintln!("Failed to create logs directory: {err}");
            return None;
        }
        let appender = tracing_appender::rolling::never("logs", "paper-digest.log");
        tracing_appender::non_blocking(appender)
    };

    let _ = LOG_GUARD.set(guard);
    Some(writer)
}
