//! Error handling for SkillHub
//!
//! This module defines the error types used throughout the application.
//! `ParticipationError` is the caller-facing taxonomy of the participation
//! core; `StoreError` and `DirectoryError` describe collaborator faults and
//! collapse into it. `SkillHubError` covers startup, configuration and the
//! HTTP shell.

use std::time::Duration;
use thiserror::Error;

use crate::models::{EventId, UserId};

/// Main error type for the SkillHub application
#[derive(Error, Debug)]
pub enum SkillHubError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Participation error: {0}")]
    Participation(#[from] ParticipationError),

    #[error("Roster store error: {0}")]
    Store(#[from] StoreError),

    #[error("Event directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Outcomes of a participation operation that the caller must be told about.
///
/// Every variant drives a distinct user-facing message, so none of them are
/// retried or downgraded inside the service. Only `Transient` is safe for a
/// caller to retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParticipationError {
    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: EventId },

    #[error("User {user_id} already participates in event {event_id}")]
    AlreadyParticipating { event_id: EventId, user_id: UserId },

    #[error("Event {event_id} is full (capacity {capacity})")]
    EventFull { event_id: EventId, capacity: u32 },

    #[error("User {user_id} does not participate in event {event_id}")]
    NotParticipating { event_id: EventId, user_id: UserId },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Event {event_id} has an invalid capacity: {reason}")]
    InvalidEvent { event_id: EventId, reason: CapacityError },

    #[error("Transient failure: {0}")]
    Transient(String),
}

impl ParticipationError {
    /// Stable machine-readable code, used by the HTTP binding
    pub fn code(&self) -> &'static str {
        match self {
            ParticipationError::EventNotFound { .. } => "EVENT_NOT_FOUND",
            ParticipationError::AlreadyParticipating { .. } => "ALREADY_PARTICIPATING",
            ParticipationError::EventFull { .. } => "EVENT_FULL",
            ParticipationError::NotParticipating { .. } => "NOT_PARTICIPATING",
            ParticipationError::InvalidInput(_) => "INVALID_INPUT",
            ParticipationError::InvalidEvent { .. } => "INVALID_EVENT",
            ParticipationError::Transient(_) => "TRANSIENT",
        }
    }

    /// Whether the caller may retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, ParticipationError::Transient(_))
    }
}

/// Faults raised by a roster store implementation
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Roster database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Roster store unavailable: {0}")]
    Unavailable(String),

    #[error("Roster store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Corrupt roster record: {0}")]
    CorruptRecord(String),

    #[error("Roster store has been shut down")]
    Closed,
}

impl From<StoreError> for ParticipationError {
    fn from(err: StoreError) -> Self {
        ParticipationError::Transient(err.to_string())
    }
}

/// Faults raised while resolving an event through the event directory
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Event database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Event API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Event API returned unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("Event directory unavailable: {0}")]
    Unavailable(String),

    #[error("Event lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("Event {event_id} has an invalid capacity: {reason}")]
    InvalidCapacity { event_id: EventId, reason: CapacityError },
}

impl From<DirectoryError> for ParticipationError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::InvalidCapacity { event_id, reason } => {
                ParticipationError::InvalidEvent { event_id, reason }
            }
            other => ParticipationError::Transient(other.to_string()),
        }
    }
}

/// Reasons a capacity value supplied by the event collaborator is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapacityError {
    #[error("capacity is missing")]
    Missing,

    #[error("capacity {0:?} is not a whole number")]
    NotANumber(String),

    #[error("capacity {0} is negative")]
    Negative(String),

    #[error("capacity {0} is too large")]
    TooLarge(String),
}

/// Result type alias for SkillHub operations
pub type Result<T> = std::result::Result<T, SkillHubError>;

/// Result type alias for participation operations
pub type ParticipationResult<T> = std::result::Result<T, ParticipationError>;

/// Result type alias for roster store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for event directory operations
pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;

impl SkillHubError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            SkillHubError::Database(_) => true,
            SkillHubError::Migration(_) => false,
            SkillHubError::Config(_) => false,
            SkillHubError::ConfigLoad(_) => false,
            SkillHubError::Participation(e) => e.is_retryable(),
            SkillHubError::Store(_) => true,
            SkillHubError::Directory(DirectoryError::InvalidCapacity { .. }) => false,
            SkillHubError::Directory(_) => true,
            SkillHubError::Http(_) => true,
            SkillHubError::Serialization(_) => false,
            SkillHubError::Io(_) => true,
            SkillHubError::UrlParse(_) => false,
            SkillHubError::Authentication(_) => false,
            SkillHubError::RateLimitExceeded => true,
            SkillHubError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SkillHubError::Migration(_) => ErrorSeverity::Critical,
            SkillHubError::Config(_) => ErrorSeverity::Critical,
            SkillHubError::ConfigLoad(_) => ErrorSeverity::Critical,
            SkillHubError::Participation(e) if !e.is_retryable() => ErrorSeverity::Info,
            SkillHubError::Authentication(_) => ErrorSeverity::Warning,
            SkillHubError::RateLimitExceeded => ErrorSeverity::Warning,
            SkillHubError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
