//! Event directory service implementation
//!
//! Resolves `GetEvent(eventId) -> {exists, capacity}` against the event
//! collaborator. Capacities arrive as free-form strings or numbers and are
//! normalized here; malformed values are rejected instead of being compared.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::config::EventsConfig;
use crate::models::{parse_capacity, EventCapacitySnapshot, EventId, EventPayload};
use crate::utils::errors::{CapacityError, DirectoryError, DirectoryResult, SkillHubError, Result};

/// Read-only lookup of event capacities
#[async_trait]
pub trait EventDirectory: Send + Sync {
    /// `Ok(None)` when the event does not exist
    async fn get_event(&self, event_id: &EventId) -> DirectoryResult<Option<EventCapacitySnapshot>>;
}

/// Event directory backed by the event service's HTTP API
#[derive(Debug, Clone)]
pub struct HttpEventDirectory {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpEventDirectory {
    /// Create a new HttpEventDirectory instance
    pub fn new(config: &EventsConfig) -> Result<Self> {
        let api_url = config
            .api_url
            .as_deref()
            .ok_or_else(|| SkillHubError::Config("Event API URL is required".to_string()))?;
        let base_url = Url::parse(api_url)?;
        let timeout = Duration::from_secs(config.timeout_seconds);

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("SkillHub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SkillHubError::Http)?;

        Ok(Self { client, base_url, timeout })
    }

    fn event_url(&self, event_id: &EventId) -> String {
        format!(
            "{}/events/{}",
            self.base_url.as_str().trim_end_matches('/'),
            urlencoding::encode(event_id.as_str())
        )
    }
}

#[async_trait]
impl EventDirectory for HttpEventDirectory {
    async fn get_event(&self, event_id: &EventId) -> DirectoryResult<Option<EventCapacitySnapshot>> {
        let url = self.event_url(event_id);
        debug!(event_id = %event_id, url = %url, "Resolving event through event API");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                DirectoryError::Timeout(self.timeout)
            } else {
                DirectoryError::Http(e)
            }
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!(event_id = %event_id, "Event API reports event missing");
                Ok(None)
            }
            status if status.is_success() => {
                let payload: EventPayload = response.json().await?;
                if let Some(ref id) = payload.id {
                    if id != event_id.as_str() {
                        warn!(event_id = %event_id, returned_id = %id, "Event API returned a different event id");
                    }
                }

                let capacity = payload
                    .capacity
                    .as_ref()
                    .ok_or(CapacityError::Missing)
                    .and_then(|raw| raw.to_capacity())
                    .map_err(|reason| DirectoryError::InvalidCapacity {
                        event_id: event_id.clone(),
                        reason,
                    })?;

                Ok(Some(EventCapacitySnapshot { event_id: event_id.clone(), capacity }))
            }
            status => {
                warn!(event_id = %event_id, status = status.as_u16(), "Event API returned unexpected status");
                Err(DirectoryError::UnexpectedStatus(status.as_u16()))
            }
        }
    }
}

/// In-process event directory holding raw capacity strings.
///
/// Mirrors the event collaborator's storage format so the same normalization
/// applies. Used by tests and by embedders that already hold event data.
#[derive(Debug, Default)]
pub struct StaticEventDirectory {
    events: RwLock<HashMap<EventId, String>>,
}

impl StaticEventDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an event with the given raw capacity
    pub fn upsert(&self, event_id: EventId, capacity: impl Into<String>) {
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(event_id, capacity.into());
    }

    pub fn remove(&self, event_id: &EventId) -> bool {
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(event_id)
            .is_some()
    }
}

#[async_trait]
impl EventDirectory for StaticEventDirectory {
    async fn get_event(&self, event_id: &EventId) -> DirectoryResult<Option<EventCapacitySnapshot>> {
        let raw = self
            .events
            .read()
            .map_err(|_| DirectoryError::Unavailable("event table lock poisoned".to_string()))?
            .get(event_id)
            .cloned();

        raw.map(|raw| {
            parse_capacity(&raw)
                .map(|capacity| EventCapacitySnapshot { event_id: event_id.clone(), capacity })
                .map_err(|reason| DirectoryError::InvalidCapacity { event_id: event_id.clone(), reason })
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str) -> EventId {
        EventId::parse(id).unwrap()
    }

    #[tokio::test]
    async fn test_static_directory_normalizes_capacity() {
        let directory = StaticEventDirectory::new();
        directory.upsert(event("evt-1"), " 12 ");
        directory.upsert(event("evt-2"), "twelve");

        let snapshot = directory.get_event(&event("evt-1")).await.unwrap().unwrap();
        assert_eq!(snapshot.capacity, 12);

        assert!(matches!(
            directory.get_event(&event("evt-2")).await,
            Err(DirectoryError::InvalidCapacity { .. })
        ));
        assert!(directory.get_event(&event("evt-3")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_poisoned_directory_reports_unavailable() {
        let directory = std::sync::Arc::new(StaticEventDirectory::new());
        directory.upsert(event("evt-1"), "3");

        let poisoner = std::sync::Arc::clone(&directory);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.events.write().unwrap();
            panic!("writer panicked while holding the lock");
        })
        .join();

        assert!(matches!(
            directory.get_event(&event("evt-1")).await,
            Err(DirectoryError::Unavailable(_))
        ));

        // Writes still land once the lock is poisoned
        directory.upsert(event("evt-2"), "4");
        assert!(directory.remove(&event("evt-2")));
    }

    #[tokio::test]
    async fn test_static_directory_remove() {
        let directory = StaticEventDirectory::new();
        directory.upsert(event("evt-1"), "3");

        assert!(directory.remove(&event("evt-1")));
        assert!(!directory.remove(&event("evt-1")));
        assert!(directory.get_event(&event("evt-1")).await.unwrap().is_none());
    }

    #[test]
    fn test_http_directory_requires_url() {
        let config = EventsConfig::default();
        assert!(matches!(HttpEventDirectory::new(&config), Err(SkillHubError::Config(_))));
    }

    #[test]
    fn test_event_url_encodes_id() {
        let config = EventsConfig {
            source: "http".to_string(),
            api_url: Some("http://events.internal/api/".to_string()),
            timeout_seconds: 2,
        };
        let directory = HttpEventDirectory::new(&config).unwrap();
        assert_eq!(
            directory.event_url(&event("org|evt:1")),
            "http://events.internal/api/events/org%7Cevt%3A1"
        );
    }
}
