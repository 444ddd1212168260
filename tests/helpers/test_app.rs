//! A router served on an ephemeral port

use std::sync::Arc;

use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{Client, Response};
use serde_json::Value;
use tokio::net::TcpListener;
use SkillHub::config::{RateLimitConfig, Settings};
use SkillHub::middleware::Claims;
use SkillHub::models::UserId;
use SkillHub::services::{MemoryRosterStore, ServiceFactory, StaticEventDirectory};
use SkillHub::{router, AppState};

use super::test_data::event;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub events: Arc<StaticEventDirectory>,
    pub roster: Arc<MemoryRosterStore>,
}

pub fn test_settings(rate_limit: Option<RateLimitConfig>) -> Settings {
    let mut settings = Settings::default();
    settings.participation.store = "memory".to_string();
    settings.participation.store_timeout_ms = 2000;
    settings.auth.jwt_secret = TEST_JWT_SECRET.to_string();
    settings.auth.leeway_seconds = 0;
    settings.rate_limit = rate_limit.unwrap_or(RateLimitConfig {
        enabled: false,
        per_minute: 30,
        burst: 10,
    });
    settings
}

impl TestApp {
    pub async fn spawn(events: &[(&str, &str)]) -> Self {
        Self::spawn_with(events, test_settings(None)).await
    }

    pub async fn spawn_with(events: &[(&str, &str)], settings: Settings) -> Self {
        let directory = Arc::new(StaticEventDirectory::new());
        for (id, capacity) in events {
            directory.upsert(event(id), *capacity);
        }
        let roster = Arc::new(MemoryRosterStore::new());

        let services = ServiceFactory::new(roster.clone(), directory.clone(), &settings, None);
        let state = AppState::new(&settings, services).expect("app state");

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
        let address = listener.local_addr().expect("local address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router(state)).await;
        });

        Self {
            base_url: format!("http://{}", address),
            client: Client::new(),
            events: directory,
            roster,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn join(&self, event_id: &str, user_id: &UserId) -> Response {
        self.client
            .post(self.url(&format!("/events/{}/participants", event_id)))
            .bearer_auth(token_for(user_id))
            .send()
            .await
            .expect("join request")
    }

    pub async fn leave(&self, event_id: &str, user_id: &UserId) -> Response {
        self.client
            .delete(self.url(&format!("/events/{}/participants/me", event_id)))
            .bearer_auth(token_for(user_id))
            .send()
            .await
            .expect("leave request")
    }

    pub async fn get_as(&self, path: &str, user_id: &UserId) -> Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token_for(user_id))
            .send()
            .await
            .expect("get request")
    }
}

/// Mint a token the way the auth service would
pub fn token_for(user_id: &UserId) -> String {
    let claims = Claims {
        sub: user_id.as_str().to_string(),
        exp: (chrono::Utc::now().timestamp() + 600) as usize,
        iss: None,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()))
        .expect("encode token")
}

/// The `error.code` field of an error response
pub async fn error_code(response: Response) -> String {
    let body: Value = response.json().await.expect("json error body");
    body["error"]["code"].as_str().unwrap_or_default().to_string()
}
