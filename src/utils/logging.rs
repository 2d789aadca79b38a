//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the VPass client.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};
use crate::config::LoggingConfig;
use crate::utils::errors::{VpassError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file appender on drop and must be held
/// for the lifetime of the program.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.file_path)?;
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "vpass.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(&config.level)
            .map_err(|e| VpassError::Config(format!("Invalid log filter: {}", e)))?)
        // The terminal belongs to the prompts; only errors go to stderr
        .with(tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(LevelFilter::ERROR))
        .with(file_layer)
        .try_init()
        .map_err(|e| VpassError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(email: &str, action: &str, details: Option<&str>) {
    info!(
        email = email,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log attendance workflow actions
pub fn log_attendance_action(attendance_id: i64, action: &str, details: Option<&str>) {
    info!(
        attendance_id = attendance_id,
        action = action,
        details = details,
        "Attendance action performed"
    );
}

/// Log stage changes of the check-in flow
pub fn log_stage_transition(attendance_id: Option<i64>, from: &str, to: &str) {
    if from == to {
        debug!(attendance_id = attendance_id, stage = to, "Stage unchanged");
    } else {
        info!(
            attendance_id = attendance_id,
            from = from,
            to = to,
            "Stage transition"
        );
    }
}

/// Log admin actions
pub fn log_admin_action(admin_email: &str, action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        admin = admin_email,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
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
