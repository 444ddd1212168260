//! Event directory backed by the shared `events` table
//!
//! The table is written by the event CRUD layer; this repository only reads
//! the capacity column, which is stored as text.

use async_trait::async_trait;
use tracing::debug;

use crate::database::connection::DatabasePool;
use crate::models::{parse_capacity, EventCapacitySnapshot, EventId, EventRow};
use crate::services::events::EventDirectory;
use crate::utils::errors::{CapacityError, DirectoryError, DirectoryResult};

#[derive(Debug, Clone)]
pub struct PgEventDirectory {
    pool: DatabasePool,
}

impl PgEventDirectory {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Find event row by ID
    pub async fn find_by_id(&self, event_id: &EventId) -> Result<Option<EventRow>, sqlx::Error> {
        sqlx::query_as::<_, EventRow>("SELECT id, capacity FROM events WHERE id = $1")
            .bind(event_id.as_str())
            .fetch_optional(&self.pool)
            .await
    }
}

#[async_trait]
impl EventDirectory for PgEventDirectory {
    async fn get_event(&self, event_id: &EventId) -> DirectoryResult<Option<EventCapacitySnapshot>> {
        let Some(row) = self.find_by_id(event_id).await? else {
            debug!(event_id = %event_id, "Event not found in events table");
            return Ok(None);
        };

        let capacity = row
            .capacity
            .as_deref()
            .ok_or(CapacityError::Missing)
            .and_then(parse_capacity)
            .map_err(|reason| DirectoryError::InvalidCapacity { event_id: event_id.clone(), reason })?;

        Ok(Some(EventCapacitySnapshot { event_id: event_id.clone(), capacity }))
    }
}
