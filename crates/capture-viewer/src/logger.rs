use std::{fs::File, io};

use thiserror::Error;
use tracing::{Level, info, subscriber::set_global_default};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt};

use crate::utilities::directories::config_dir;

const LOG_FILE: &str = "capture-viewer.log";

/// Log to stdout and to a log file in the config directory. The guards must be held until exit.
pub fn setup_logger(debug: bool) -> Result<[WorkerGuard; 2], LoggerError> {
    let level = if debug { Level::TRACE } else { Level::INFO };

    let filter = tracing_subscriber::filter::Targets::new()
        .with_default(level)
        .with_target("winit", Level::WARN);

    // stdout logger
    let (std_writer, std_guard) = tracing_appender::non_blocking(io::stdout());
    let std_logger = tracing_subscriber::fmt::layer()
        .with_writer(std_writer)
        .with_ansi(false)
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE);

    // file logger
    let file = File::create(config_dir().join(LOG_FILE)).map_err(LoggerError::LogFile)?;
    let (file_writer, file_guard) = tracing_appender::non_blocking(file);
    let file_logger = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(debug)
        .with_span_events(FmtSpan::CLOSE);

    // Register loggers
    let collector = tracing_subscriber::registry()
        .with(std_logger)
        .with(file_logger)
        .with(filter);

    set_global_default(collector)?;

    info!("Logging to {LOG_FILE}");
    Ok([std_guard, file_guard])
}

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Failed to create the log file:\n{0}")]
    LogFile(#[source] io::Error),

    #[error("Failed to set the global logger:\n{0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}
