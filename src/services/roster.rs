//! Roster store abstraction
//!
//! A roster store holds one participation record per (event, user) pair and
//! derives participant counts on demand. Implementations must make
//! `try_insert` atomic with respect to the pair: when two callers race on the
//! same pair exactly one of them observes `Inserted`. That guarantee has to
//! come from the store itself, since service instances share nothing else.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use crate::models::{EventId, InsertOutcome, ParticipationRecord, RemoveOutcome, UserId};
use crate::utils::errors::{StoreError, StoreResult};

/// Durable, race-safe storage of participation records
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// Create a `registered` record unless one already exists for the pair
    async fn try_insert(&self, event_id: &EventId, user_id: &UserId) -> StoreResult<InsertOutcome>;

    /// Number of records for the event, reflecting every commit ordered before the call
    async fn count_by_event(&self, event_id: &EventId) -> StoreResult<u64>;

    /// Delete the record for the pair if present
    async fn remove(&self, event_id: &EventId, user_id: &UserId) -> StoreResult<RemoveOutcome>;

    async fn get(&self, event_id: &EventId, user_id: &UserId) -> StoreResult<Option<ParticipationRecord>>;

    /// Records of one event, oldest join first
    async fn list_by_event(&self, event_id: &EventId) -> StoreResult<Vec<ParticipationRecord>>;

    /// Records of one user, newest join first
    async fn list_by_user(&self, user_id: &UserId) -> StoreResult<Vec<ParticipationRecord>>;

    async fn health_check(&self) -> StoreResult<()>;

    /// Release connections; later calls fail with `StoreError::Closed`
    async fn shutdown(&self);

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}

type PairKey = (EventId, UserId);

/// In-process roster store.
///
/// The map lock is the atomic primitive here, so it only serializes callers
/// inside one process. Use it for tests and single-instance development.
#[derive(Debug, Default)]
pub struct MemoryRosterStore {
    records: Mutex<HashMap<PairKey, ParticipationRecord>>,
    closed: AtomicBool,
}

impl MemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all events
    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn records(&self) -> StoreResult<MutexGuard<'_, HashMap<PairKey, ParticipationRecord>>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("roster lock poisoned".to_string()))
    }
}

#[async_trait]
impl RosterStore for MemoryRosterStore {
    async fn try_insert(&self, event_id: &EventId, user_id: &UserId) -> StoreResult<InsertOutcome> {
        let mut records = self.records()?;
        let key = (event_id.clone(), user_id.clone());

        if records.contains_key(&key) {
            debug!(event_id = %event_id, user_id = %user_id, "Pair already present in memory roster");
            return Ok(InsertOutcome::AlreadyExists);
        }

        let record = ParticipationRecord::registered(event_id.clone(), user_id.clone(), Utc::now());
        records.insert(key, record.clone());
        Ok(InsertOutcome::Inserted(record))
    }

    async fn count_by_event(&self, event_id: &EventId) -> StoreResult<u64> {
        let records = self.records()?;
        let count = records.keys().filter(|(event, _)| event == event_id).count();
        Ok(count as u64)
    }

    async fn remove(&self, event_id: &EventId, user_id: &UserId) -> StoreResult<RemoveOutcome> {
        let mut records = self.records()?;
        match records.remove(&(event_id.clone(), user_id.clone())) {
            Some(_) => Ok(RemoveOutcome::Removed),
            None => Ok(RemoveOutcome::NotFound),
        }
    }

    async fn get(&self, event_id: &EventId, user_id: &UserId) -> StoreResult<Option<ParticipationRecord>> {
        let records = self.records()?;
        Ok(records.get(&(event_id.clone(), user_id.clone())).cloned())
    }

    async fn list_by_event(&self, event_id: &EventId) -> StoreResult<Vec<ParticipationRecord>> {
        let records = self.records()?;
        let mut roster: Vec<ParticipationRecord> = records
            .values()
            .filter(|record| &record.event_id == event_id)
            .cloned()
            .collect();
        roster.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.user_id.cmp(&b.user_id)));
        Ok(roster)
    }

    async fn list_by_user(&self, user_id: &UserId) -> StoreResult<Vec<ParticipationRecord>> {
        let records = self.records()?;
        let mut joined: Vec<ParticipationRecord> = records
            .values()
            .filter(|record| &record.user_id == user_id)
            .cloned()
            .collect();
        joined.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.event_id.cmp(&b.event_id)));
        Ok(joined)
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.records().map(|_| ())
    }

    async fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        info!("Memory roster store shut down");
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
