//! Tracing setup for the command-line front end.
//!
//! Events always go to stderr, filtered by `RUST_LOG` or, when that is unset,
//! by the `-q`/`-v` flags. With `debug = true` in the settings a second layer
//! writes everything at `debug` and above to a daily-rolling `avsp.log` in
//! the system temp directory.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

/// Initialize the subscriber.
///
/// Returns the file writer's `WorkerGuard` when file logging is on; it must
/// be held until exit or buffered lines are lost.
pub fn init_tracing(default_level: &str, file_logging: bool) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(env_filter);

    if !file_logging {
        let _ = Registry::default().with(stderr_layer).try_init();
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(std::env::temp_dir(), "avsp.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(EnvFilter::new("debug"));

    let _ = Registry::default()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    Some(guard)
}
