//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the SkillHub participation service.

use tracing::{info, warn, debug, error};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::utils::errors::{SkillHubError, ParticipationError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the rolling file writer on drop and must be
/// held for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| SkillHubError::Config(format!("Invalid log filter: {}", e)))?;

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, "skillhub.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_ansi(false).with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    let init_result = if config.json {
        registry.with(fmt::layer().json().with_writer(std::io::stdout)).try_init()
    } else {
        registry.with(fmt::layer().with_writer(std::io::stdout)).try_init()
    };
    init_result.map_err(|e| SkillHubError::Config(format!("Failed to install logger: {}", e)))?;

    info!(level = %config.level, json = config.json, "Logging initialized");
    Ok(guard)
}

/// Log a successful participation change
pub fn log_participation_action(event_id: &str, user_id: &str, action: &str, participant_count: u64) {
    info!(
        event_id = event_id,
        user_id = user_id,
        action = action,
        participant_count = participant_count,
        "Participation action performed"
    );
}

/// Log a rejected join or leave.
///
/// Business rejections are expected traffic and stay at `info`; transient
/// faults are logged at `error`.
pub fn log_admission_rejected(event_id: &str, user_id: &str, action: &str, reason: &ParticipationError) {
    if reason.is_retryable() {
        error!(
            event_id = event_id,
            user_id = user_id,
            action = action,
            error = %reason,
            "Participation action failed"
        );
    } else {
        info!(
            event_id = event_id,
            user_id = user_id,
            action = action,
            code = reason.code(),
            "Participation action rejected"
        );
    }
}

/// Log admission beyond capacity caused by racing joins
pub fn log_capacity_overshoot(event_id: &str, participant_count: u64, capacity: u32) {
    warn!(
        event_id = event_id,
        participant_count = participant_count,
        capacity = capacity,
        overshoot = participant_count.saturating_sub(u64::from(capacity)),
        "Event admitted participants beyond capacity"
    );
}

/// Log a call to the roster store or the event directory
pub fn log_collaborator_call(collaborator: &str, operation: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            collaborator = collaborator,
            operation = operation,
            duration_ms = duration_ms,
            "Collaborator call completed"
        );
    } else {
        error!(
            collaborator = collaborator,
            operation = operation,
            duration_ms = duration_ms,
            "Collaborator call failed"
        );
    }
}
