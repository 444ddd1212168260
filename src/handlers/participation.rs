//! Participation endpoints
//!
//! Thin adapters between HTTP and `ParticipationService`. The caller's
//! identity always comes from the bearer token, never from the request.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use crate::handlers::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::{
    EventId, JoinOutcome, LeaveOutcome, ParticipationStatusView, Roster, UserParticipations,
};
use crate::state::AppState;

/// `POST /events/:event_id/participants`
pub async fn join_event(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(event_id): Path<String>,
) -> Result<(StatusCode, Json<JoinOutcome>), ApiError> {
    let event_id = EventId::parse(event_id)?;
    state.check_rate_limit(&user_id)?;

    debug!(event_id = %event_id, user_id = %user_id, "Join requested");
    let outcome = state.participation().join(&event_id, &user_id).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// `DELETE /events/:event_id/participants/me`
pub async fn leave_event(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(event_id): Path<String>,
) -> Result<Json<LeaveOutcome>, ApiError> {
    let event_id = EventId::parse(event_id)?;
    state.check_rate_limit(&user_id)?;

    debug!(event_id = %event_id, user_id = %user_id, "Leave requested");
    let outcome = state.participation().leave(&event_id, &user_id).await?;
    Ok(Json(outcome))
}

/// `GET /events/:event_id/participation`
pub async fn participation_status(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(event_id): Path<String>,
) -> Result<Json<ParticipationStatusView>, ApiError> {
    let event_id = EventId::parse(event_id)?;
    let view = state.participation().status(&event_id, &user_id).await?;
    Ok(Json(view))
}

/// `GET /events/:event_id/participants`
pub async fn list_participants(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(event_id): Path<String>,
) -> Result<Json<Roster>, ApiError> {
    let event_id = EventId::parse(event_id)?;
    let roster = state.participation().list_participants(&event_id).await?;
    Ok(Json(roster))
}

/// `GET /me/participations`
pub async fn my_participations(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserParticipations>, ApiError> {
    let participations = state.participation().list_user_participations(&user_id).await?;
    Ok(Json(participations))
}
