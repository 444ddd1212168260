//! Error types for HTTP handlers
//!
//! Bridges `ParticipationError` and `SkillHubError` to JSON error responses
//! of the form `{ "error": { "code", "message", "retryable" } }`.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::utils::errors::{ErrorSeverity, ParticipationError, SkillHubError};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    retryable: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_INPUT", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<ParticipationError> for ApiError {
    fn from(err: ParticipationError) -> Self {
        let status = match &err {
            ParticipationError::EventNotFound { .. } => StatusCode::NOT_FOUND,
            ParticipationError::AlreadyParticipating { .. }
            | ParticipationError::EventFull { .. }
            | ParticipationError::NotParticipating { .. } => StatusCode::CONFLICT,
            ParticipationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ParticipationError::InvalidEvent { .. } => StatusCode::BAD_GATEWAY,
            ParticipationError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        Self {
            status,
            code: err.code(),
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

impl From<SkillHubError> for ApiError {
    fn from(err: SkillHubError) -> Self {
        match err {
            SkillHubError::Participation(e) => e.into(),
            SkillHubError::Authentication(message) => Self::unauthorized(message),
            SkillHubError::RateLimitExceeded => {
                Self::new(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", "Too many requests").retryable()
            }
            SkillHubError::InvalidInput(message) => Self::bad_request(message),
            other => {
                match other.severity() {
                    ErrorSeverity::Critical | ErrorSeverity::Error => {
                        error!(error = %other, severity = %other.severity(), "Unhandled error in request")
                    }
                    _ => warn!(error = %other, "Unhandled error in request"),
                }
                if other.is_recoverable() {
                    Self::new(StatusCode::SERVICE_UNAVAILABLE, "TRANSIENT", "Service temporarily unavailable")
                        .retryable()
                } else {
                    Self::internal()
                }
            }
        }
    }
}

/// JSON error envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, code = self.code, message = %self.message, "Request failed");
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code.to_string(),
                message: self.message,
                retryable: self.retryable,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventId, UserId};
    use crate::utils::errors::CapacityError;

    fn event() -> EventId {
        EventId::parse("evt-1").unwrap()
    }

    fn user() -> UserId {
        UserId::parse("user-1").unwrap()
    }

    #[test]
    fn test_participation_status_mapping() {
        let cases = vec![
            (ParticipationError::EventNotFound { event_id: event() }, StatusCode::NOT_FOUND, "EVENT_NOT_FOUND"),
            (
                ParticipationError::AlreadyParticipating { event_id: event(), user_id: user() },
                StatusCode::CONFLICT,
                "ALREADY_PARTICIPATING",
            ),
            (ParticipationError::EventFull { event_id: event(), capacity: 2 }, StatusCode::CONFLICT, "EVENT_FULL"),
            (
                ParticipationError::NotParticipating { event_id: event(), user_id: user() },
                StatusCode::CONFLICT,
                "NOT_PARTICIPATING",
            ),
            (ParticipationError::InvalidInput("bad".into()), StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            (
                ParticipationError::InvalidEvent { event_id: event(), reason: CapacityError::Missing },
                StatusCode::BAD_GATEWAY,
                "INVALID_EVENT",
            ),
            (ParticipationError::Transient("down".into()), StatusCode::SERVICE_UNAVAILABLE, "TRANSIENT"),
        ];

        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status(), status);
            assert_eq!(api.code(), code);
        }
    }

    #[test]
    fn test_only_transient_and_rate_limit_are_retryable() {
        let transient: ApiError = ParticipationError::Transient("timeout".into()).into();
        assert!(transient.retryable);

        let full: ApiError = ParticipationError::EventFull { event_id: event(), capacity: 1 }.into();
        assert!(!full.retryable);

        let limited: ApiError = SkillHubError::RateLimitExceeded.into();
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(limited.retryable);
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let api: ApiError = SkillHubError::Config("secret detail".into()).into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.to_string().contains("secret"));

        let api: ApiError = SkillHubError::Store(crate::utils::errors::StoreError::Closed).into();
        assert_eq!(api.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(api.retryable);
    }
}
