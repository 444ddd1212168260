//! Services module
//!
//! This module contains the participation core and its collaborators

pub mod events;
pub mod participation;
pub mod roster;

// Re-export commonly used services
pub use events::{EventDirectory, HttpEventDirectory, StaticEventDirectory};
pub use participation::{ParticipationService, DEFAULT_STORE_TIMEOUT};
pub use roster::{MemoryRosterStore, RosterStore};

use std::sync::Arc;
use tracing::info;

use crate::config::settings::Settings;
use crate::config::validation::uses_database;
use crate::database::{create_pool, run_migrations, DatabasePool, PgEventDirectory, PgRosterStore};
use crate::utils::errors::{Result, SkillHubError};

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub participation_service: ParticipationService,
    pub roster: Arc<dyn RosterStore>,
    pool: Option<DatabasePool>,
}

impl ServiceFactory {
    /// Build every service from settings, connecting to PostgreSQL when needed
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let pool = if uses_database(settings) {
            info!("Connecting to database...");
            let pool = create_pool(&settings.database).await?;
            if settings.database.run_migrations {
                run_migrations(&pool).await?;
            }
            Some(pool)
        } else {
            None
        };

        let roster: Arc<dyn RosterStore> = match (settings.participation.store.as_str(), &pool) {
            ("postgres", Some(pool)) => Arc::new(PgRosterStore::new(pool.clone())),
            ("memory", _) => Arc::new(MemoryRosterStore::new()),
            (other, _) => {
                return Err(SkillHubError::Config(format!("Unsupported roster store: {}", other)));
            }
        };

        let events: Arc<dyn EventDirectory> = match (settings.events.source.as_str(), &pool) {
            ("database", Some(pool)) => Arc::new(PgEventDirectory::new(pool.clone())),
            ("http", _) => Arc::new(HttpEventDirectory::new(&settings.events)?),
            (other, _) => {
                return Err(SkillHubError::Config(format!("Unsupported events source: {}", other)));
            }
        };

        info!(
            roster = roster.backend(),
            events = %settings.events.source,
            timeout_ms = settings.participation.store_timeout_ms,
            "Participation services initialized"
        );

        Ok(Self::new(roster, events, settings, pool))
    }

    /// Assemble services from already constructed collaborators
    pub fn new(
        roster: Arc<dyn RosterStore>,
        events: Arc<dyn EventDirectory>,
        settings: &Settings,
        pool: Option<DatabasePool>,
    ) -> Self {
        let participation_service = ParticipationService::new(
            Arc::clone(&roster),
            events,
            settings.participation.store_timeout(),
        );

        Self {
            participation_service,
            roster,
            pool,
        }
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let roster_healthy = tokio::time::timeout(
            self.participation_service.timeout(),
            self.roster.health_check(),
        )
        .await
        .map(|result| result.is_ok())
        .unwrap_or(false);

        ServiceHealthStatus {
            roster_backend: self.roster.backend(),
            roster_healthy,
        }
    }

    /// Close the roster store and the shared pool
    pub async fn shutdown(&self) {
        self.roster.shutdown().await;
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
        info!("Services shut down");
    }
}

/// Health status for all services
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealthStatus {
    pub roster_backend: &'static str,
    pub roster_healthy: bool,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.roster_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.roster_healthy {
            issues.push(format!("Roster store ({}) unreachable", self.roster_backend));
        }

        issues
    }
}
