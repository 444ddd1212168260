//! HTTP handlers module
//!
//! This module wires the participation endpoints into an axum router.

pub mod error;
pub mod health;
pub mod participation;

pub use error::{ApiError, ErrorBody, ErrorResponse};

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::log_requests;
use crate::state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/events/:event_id/participants",
            post(participation::join_event).get(participation::list_participants),
        )
        .route("/events/:event_id/participants/me", delete(participation::leave_event))
        .route("/events/:event_id/participation", get(participation::participation_status))
        .route("/me/participations", get(participation::my_participations))
        .layer(axum::middleware::from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
