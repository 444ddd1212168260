//! PostgreSQL roster store
//!
//! Uniqueness of (event_id, user_id) is the table's primary key. Inserts use
//! `ON CONFLICT DO NOTHING`, so a lost race surfaces as zero returned rows
//! instead of an error; a unique violation from any other path is mapped to
//! the same outcome.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use crate::database::connection::{self, DatabasePool};
use crate::models::{
    EventId, InsertOutcome, ParticipationRecord, ParticipationRow, ParticipationStatus, RemoveOutcome, UserId,
};
use crate::services::roster::RosterStore;
use crate::utils::errors::{StoreError, StoreResult};

const RECORD_COLUMNS: &str = "event_id, user_id, status, check_in_time, check_out_time, \
                              feedback_rating, feedback_comment, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgRosterStore {
    pool: DatabasePool,
}

impl PgRosterStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn check_open(&self) -> StoreResult<()> {
        if self.pool.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn into_records(rows: Vec<ParticipationRow>) -> StoreResult<Vec<ParticipationRecord>> {
        rows.into_iter().map(ParticipationRecord::try_from).collect()
    }
}

#[async_trait]
impl RosterStore for PgRosterStore {
    async fn try_insert(&self, event_id: &EventId, user_id: &UserId) -> StoreResult<InsertOutcome> {
        self.check_open()?;
        let now = Utc::now();

        let inserted = sqlx::query_as::<_, ParticipationRow>(&format!(
            r#"
            INSERT INTO event_participations (event_id, user_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (event_id, user_id) DO NOTHING
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(event_id.as_str())
        .bind(user_id.as_str())
        .bind(ParticipationStatus::Registered.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await;

        match inserted {
            Ok(Some(row)) => Ok(InsertOutcome::Inserted(row.try_into()?)),
            Ok(None) => {
                debug!(event_id = %event_id, user_id = %user_id, "Insert skipped by uniqueness constraint");
                Ok(InsertOutcome::AlreadyExists)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                debug!(event_id = %event_id, user_id = %user_id, "Insert rejected by uniqueness constraint");
                Ok(InsertOutcome::AlreadyExists)
            }
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    async fn count_by_event(&self, event_id: &EventId) -> StoreResult<u64> {
        self.check_open()?;
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM event_participations WHERE event_id = $1"
        )
        .bind(event_id.as_str())
        .fetch_one(&self.pool)
        .await?;

        u64::try_from(count.0).map_err(|_| StoreError::CorruptRecord(format!("negative count {}", count.0)))
    }

    async fn remove(&self, event_id: &EventId, user_id: &UserId) -> StoreResult<RemoveOutcome> {
        self.check_open()?;
        let result = sqlx::query("DELETE FROM event_participations WHERE event_id = $1 AND user_id = $2")
            .bind(event_id.as_str())
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            Ok(RemoveOutcome::Removed)
        } else {
            Ok(RemoveOutcome::NotFound)
        }
    }

    async fn get(&self, event_id: &EventId, user_id: &UserId) -> StoreResult<Option<ParticipationRecord>> {
        self.check_open()?;
        let row = sqlx::query_as::<_, ParticipationRow>(&format!(
            "SELECT {} FROM event_participations WHERE event_id = $1 AND user_id = $2",
            RECORD_COLUMNS
        ))
        .bind(event_id.as_str())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ParticipationRecord::try_from).transpose()
    }

    async fn list_by_event(&self, event_id: &EventId) -> StoreResult<Vec<ParticipationRecord>> {
        self.check_open()?;
        let rows = sqlx::query_as::<_, ParticipationRow>(&format!(
            "SELECT {} FROM event_participations WHERE event_id = $1 ORDER BY created_at ASC, user_id ASC",
            RECORD_COLUMNS
        ))
        .bind(event_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Self::into_records(rows)
    }

    async fn list_by_user(&self, user_id: &UserId) -> StoreResult<Vec<ParticipationRecord>> {
        self.check_open()?;
        let rows = sqlx::query_as::<_, ParticipationRow>(&format!(
            "SELECT {} FROM event_participations WHERE user_id = $1 ORDER BY created_at DESC, event_id ASC",
            RECORD_COLUMNS
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Self::into_records(rows)
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.check_open()?;
        connection::health_check(&self.pool).await?;
        Ok(())
    }

    async fn shutdown(&self) {
        self.pool.close().await;
        info!("PostgreSQL roster store shut down");
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
