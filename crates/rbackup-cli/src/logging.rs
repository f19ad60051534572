//! Tracing subscriber setup.

use anyhow::Context;
use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const TIME_FORMAT: &str = "%y-%m-%d %H:%M:%S";
const LOG_FILE_PREFIX: &str = "rbackup.log";

/// Level used when `RUST_LOG` is not set.
pub fn default_level(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    }
}

/// Installs the global subscriber: stderr always, plus a daily-rotating file
/// in `log_dir` when given.
///
/// The returned guard must be held until exit so buffered file output is
/// flushed.
pub fn init(verbose: bool, quiet: bool, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, quiet)));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_target(false);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(rolling::daily(dir, LOG_FILE_PREFIX));
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}
