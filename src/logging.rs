use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::Result;
use crate::config::LoggingConfig;

const DEFAULT_FILTER: &str = "info";

/// Install console and file logging.
///
/// The returned guard flushes the file writer when dropped, so the caller
/// must keep it alive for as long as it wants file output.
#[inline]
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    fs::create_dir_all(&config.directory)?;

    let file_appender = tracing_appender::rolling::never(&config.directory, &config.file_name);
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(non_blocking_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::QaError::Other(anyhow::anyhow!("Failed to initialize logging: {}", e)))?;

    tracing::info!(
        "Logging to {}",
        config.directory.join(&config.file_name).display()
    );

    Ok(guard)
}
