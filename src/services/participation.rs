//! Participation service implementation
//!
//! Enforces capacity-bounded admission on top of a [`RosterStore`].
//!
//! Admission is an optimistic check-then-insert: the service reads the
//! current count, rejects when the event is full, and then relies on the
//! store's atomic insert-if-absent. No lock spans the whole join, so joins
//! racing at the capacity boundary may all pass the count check. With R joins
//! racing for the last seat, at most R - 1 extra participants are admitted.
//! Duplicate admissions of the same user are impossible regardless of timing
//! because the store's uniqueness constraint has the final word.
//!
//! Counts are always derived from the store on demand; nothing here caches
//! roster state between calls, so any number of service instances can share
//! one store.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::models::{
    EventCapacitySnapshot, EventId, InsertOutcome, JoinOutcome, LeaveOutcome,
    ParticipationStatusView, RemoveOutcome, Roster, UserId, UserParticipations,
};
use crate::services::events::EventDirectory;
use crate::services::roster::RosterStore;
use crate::utils::errors::{
    DirectoryError, DirectoryResult, ParticipationError, ParticipationResult, StoreError, StoreResult,
};
use crate::utils::helpers::elapsed_ms;
use crate::utils::logging::{
    log_admission_rejected, log_capacity_overshoot, log_collaborator_call, log_participation_action,
};

/// Default bound on a single store or directory call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Capacity-aware participation management
#[derive(Clone)]
pub struct ParticipationService {
    roster: Arc<dyn RosterStore>,
    events: Arc<dyn EventDirectory>,
    timeout: Duration,
}

impl ParticipationService {
    /// Create a new ParticipationService instance
    pub fn new(roster: Arc<dyn RosterStore>, events: Arc<dyn EventDirectory>, timeout: Duration) -> Self {
        Self { roster, events, timeout }
    }

    pub fn roster(&self) -> &Arc<dyn RosterStore> {
        &self.roster
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Admit `user_id` to `event_id` if there is room
    pub async fn join(&self, event_id: &EventId, user_id: &UserId) -> ParticipationResult<JoinOutcome> {
        let result = self.admit(event_id, user_id).await;
        match &result {
            Ok(outcome) => {
                log_participation_action(event_id.as_str(), user_id.as_str(), "join", outcome.participant_count)
            }
            Err(e) => log_admission_rejected(event_id.as_str(), user_id.as_str(), "join", e),
        }
        result
    }

    async fn admit(&self, event_id: &EventId, user_id: &UserId) -> ParticipationResult<JoinOutcome> {
        let event = self.resolve_event(event_id).await?;

        if self.store_call("get", self.roster.get(event_id, user_id)).await?.is_some() {
            return Err(ParticipationError::AlreadyParticipating {
                event_id: event_id.clone(),
                user_id: user_id.clone(),
            });
        }

        let current = self.store_call("count_by_event", self.roster.count_by_event(event_id)).await?;
        if current >= u64::from(event.capacity) {
            return Err(ParticipationError::EventFull {
                event_id: event_id.clone(),
                capacity: event.capacity,
            });
        }

        match self.store_call("try_insert", self.roster.try_insert(event_id, user_id)).await? {
            InsertOutcome::AlreadyExists => Err(ParticipationError::AlreadyParticipating {
                event_id: event_id.clone(),
                user_id: user_id.clone(),
            }),
            InsertOutcome::Inserted(_) => {
                let participant_count = self.recount(event_id, user_id, "join", current + 1).await;
                if participant_count > u64::from(event.capacity) {
                    log_capacity_overshoot(event_id.as_str(), participant_count, event.capacity);
                }

                Ok(JoinOutcome { participant_count, capacity: event.capacity })
            }
        }
    }

    /// Remove `user_id` from `event_id`
    pub async fn leave(&self, event_id: &EventId, user_id: &UserId) -> ParticipationResult<LeaveOutcome> {
        let result = self.withdraw(event_id, user_id).await;
        match &result {
            Ok(outcome) => {
                log_participation_action(event_id.as_str(), user_id.as_str(), "leave", outcome.participant_count)
            }
            Err(e) => log_admission_rejected(event_id.as_str(), user_id.as_str(), "leave", e),
        }
        result
    }

    async fn withdraw(&self, event_id: &EventId, user_id: &UserId) -> ParticipationResult<LeaveOutcome> {
        self.resolve_event(event_id).await?;
        let current = self.store_call("count_by_event", self.roster.count_by_event(event_id)).await?;

        match self.store_call("remove", self.roster.remove(event_id, user_id)).await? {
            RemoveOutcome::NotFound => Err(ParticipationError::NotParticipating {
                event_id: event_id.clone(),
                user_id: user_id.clone(),
            }),
            RemoveOutcome::Removed => {
                let participant_count = self.recount(event_id, user_id, "leave", current.saturating_sub(1)).await;
                Ok(LeaveOutcome { participant_count })
            }
        }
    }

    /// Whether `user_id` participates, with the live count and capacity
    pub async fn status(&self, event_id: &EventId, user_id: &UserId) -> ParticipationResult<ParticipationStatusView> {
        let event = self.resolve_event(event_id).await?;
        let is_participating = self.store_call("get", self.roster.get(event_id, user_id)).await?.is_some();
        let participant_count = self.store_call("count_by_event", self.roster.count_by_event(event_id)).await?;

        debug!(event_id = %event_id, user_id = %user_id, is_participating, participant_count, "Participation status resolved");
        Ok(ParticipationStatusView {
            is_participating,
            participant_count,
            capacity: event.capacity,
        })
    }

    /// Roster of an event; the caller is already authorized to see it
    pub async fn list_participants(&self, event_id: &EventId) -> ParticipationResult<Roster> {
        self.resolve_event(event_id).await?;
        let participants = self.store_call("list_by_event", self.roster.list_by_event(event_id)).await?;
        let count = participants.len() as u64;

        debug!(event_id = %event_id, count, "Roster listed");
        Ok(Roster { participants, count })
    }

    /// Every participation of one user, newest first
    pub async fn list_user_participations(&self, user_id: &UserId) -> ParticipationResult<UserParticipations> {
        let participations = self.store_call("list_by_user", self.roster.list_by_user(user_id)).await?;
        let count = participations.len() as u64;

        debug!(user_id = %user_id, count, "User participations listed");
        Ok(UserParticipations { participations, count })
    }

    /// Count after a committed mutation. The mutation already succeeded, so a
    /// failed recount reports the count observed before it, adjusted by one.
    async fn recount(&self, event_id: &EventId, user_id: &UserId, action: &str, fallback: u64) -> u64 {
        match self.store_call("count_by_event", self.roster.count_by_event(event_id)).await {
            Ok(count) => count,
            Err(e) => {
                warn!(
                    event_id = %event_id,
                    user_id = %user_id,
                    action = action,
                    participant_count = fallback,
                    error = %e,
                    "Recount after committed mutation failed, reporting last observed count"
                );
                fallback
            }
        }
    }

    async fn resolve_event(&self, event_id: &EventId) -> ParticipationResult<EventCapacitySnapshot> {
        self.directory_call("get_event", self.events.get_event(event_id))
            .await?
            .ok_or_else(|| ParticipationError::EventNotFound { event_id: event_id.clone() })
    }

    /// Run one collaborator call under the configured timeout.
    ///
    /// Expiry is reported as `Transient` and never retried here: a join that
    /// timed out may or may not have committed, and only the caller can decide
    /// whether to ask again.
    async fn bounded<T, E, F>(
        &self,
        collaborator: &'static str,
        operation: &'static str,
        call: F,
        on_timeout: fn(Duration) -> E,
    ) -> ParticipationResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<ParticipationError>,
    {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or_else(|_| Err(on_timeout(self.timeout)));

        log_collaborator_call(collaborator, operation, elapsed_ms(started), outcome.is_ok());
        outcome.map_err(Into::into)
    }

    async fn store_call<T, F>(&self, operation: &'static str, call: F) -> ParticipationResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        self.bounded(self.roster.backend(), operation, call, StoreError::Timeout).await
    }

    async fn directory_call<T, F>(&self, operation: &'static str, call: F) -> ParticipationResult<T>
    where
        F: Future<Output = DirectoryResult<T>>,
    {
        self.bounded("event_directory", operation, call, DirectoryError::Timeout).await
    }
}
