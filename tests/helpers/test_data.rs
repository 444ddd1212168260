//! Test data builders

use std::sync::Arc;
use std::time::Duration;

use fake::{Fake, Faker};
use SkillHub::models::{EventId, UserId};
use SkillHub::services::{MemoryRosterStore, ParticipationService, StaticEventDirectory};

pub const TEST_TIMEOUT: Duration = Duration::from_secs(2);

pub fn event(id: &str) -> EventId {
    EventId::parse(id).expect("valid event id")
}

pub fn user(id: &str) -> UserId {
    UserId::parse(id).expect("valid user id")
}

/// A user id unlikely to collide with any other in the same test
pub fn random_user() -> UserId {
    let suffix: u64 = Faker.fake();
    user(&format!("user-{}", suffix))
}

/// In-memory participation service plus handles on its collaborators
pub struct MemoryFixture {
    pub service: ParticipationService,
    pub events: Arc<StaticEventDirectory>,
    pub roster: Arc<MemoryRosterStore>,
}

impl MemoryFixture {
    /// Events are given as `(event_id, raw_capacity)` pairs
    pub fn new(events: &[(&str, &str)]) -> Self {
        let directory = Arc::new(StaticEventDirectory::new());
        for (id, capacity) in events {
            directory.upsert(event(id), *capacity);
        }
        let roster = Arc::new(MemoryRosterStore::new());
        let service = ParticipationService::new(roster.clone(), directory.clone(), TEST_TIMEOUT);

        Self { service, events: directory, roster }
    }
}
