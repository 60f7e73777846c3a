use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding an `EnvFilter` directive, e.g. `debug`
pub const LOG_ENV: &str = "DRILLR_LOG";

/// Route tracing output to `<log_dir>/drillr.<timestamp>.log`.
///
/// The terminal belongs to the TUI, so nothing is written to stdout or
/// stderr. Returns the appender guard, which must live until shutdown so
/// buffered lines get flushed. `None` means logging could not be set up and
/// the app runs without it.
pub fn init(log_dir: &Path) -> Option<WorkerGuard> {
    std::fs::create_dir_all(log_dir).ok()?;

    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let file_appender =
        tracing_appender::rolling::never(log_dir, format!("drillr.{timestamp}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(non_blocking);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .ok()?;

    Some(guard)
}
