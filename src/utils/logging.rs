//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the administration console.

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::utils::errors::{AdminError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file appender when dropped, so the caller
/// must hold it for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| AdminError::Config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let stdout_layer = if config.format == "json" {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, "event-admin.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AdminError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(action: &str, target: Option<&str>, details: Option<&str>) {
    info!(
        action = action,
        target = target,
        details = details,
        "User action performed"
    );
}

/// Log an outbound API request
pub fn log_api_request(method: &str, url: &str, resource: &str, operation: &str) {
    debug!(
        method = method,
        url = url,
        resource = resource,
        operation = operation,
        "Sending API request"
    );
}

/// Log API errors with context
pub fn log_api_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "API error occurred"
    );
}

/// Log query cache activity
pub fn log_cache_event(key: &str, event: &str, generation: Option<u64>) {
    debug!(
        key = key,
        event = event,
        generation = generation,
        "Query cache event"
    );
}

/// Log form submission results
pub fn log_form_submission(form: &str, outcome: &str, details: Option<&str>) {
    if outcome == "failed" {
        warn!(
            form = form,
            outcome = outcome,
            details = details,
            "Form submission failed"
        );
    } else {
        info!(
            form = form,
            outcome = outcome,
            details = details,
            "Form submission finished"
        );
    }
}
