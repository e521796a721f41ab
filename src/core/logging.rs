//! Logging initialization.
//!
//! One subscriber for the whole process:
//! - JSON file layer, rolled daily, in the configured log directory
//! - Optional pretty stdout layer
//! - `log` crate records bridged into `tracing`
//!
//! The filter comes from `RUST_LOG` when set, otherwise from
//! [`LoggingConfig::level`].

use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

pub const LOG_FILE_PREFIX: &str = "tomekeeper.log";

// ============================================================================
// Logging Initialization
// ============================================================================

/// Build the filter: `RUST_LOG` wins, then `level`, then `info`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global subscriber.
///
/// Returns a `WorkerGuard` that must stay alive for the life of the process
/// so buffered file output is flushed on shutdown. Calling this twice leaves
/// the first subscriber in place.
pub fn init(config: &LoggingConfig) -> WorkerGuard {
    let log_dir = config.log_dir();
    ensure_dir(&log_dir);

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(env_filter(&config.level));

    let stdout_layer = config.stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_ansi(io::stdout().is_terminal())
            .pretty()
            .with_filter(env_filter(&config.level))
    });

    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer);

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {}", e);
        return guard;
    }

    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {}", e);
    }

    init_miette();

    tracing::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join(LOG_FILE_PREFIX)
    );

    guard
}

fn ensure_dir(log_dir: &Path) {
    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("Failed to create logs directory: {}", e);
        }
    }
}

/// Configure miette's report handler for the binary.
fn init_miette() {
    let color = io::stderr().is_terminal();

    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .color(color)
                .build(),
        )
    }))
    .ok(); // Ignore if already set
}
