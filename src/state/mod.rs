//! Shared application state
//!
//! Everything a request handler needs, cloned cheaply into each request.

use std::sync::Arc;

use crate::config::Settings;
use crate::middleware::{RateLimitMiddleware, TokenVerifier};
use crate::models::UserId;
use crate::services::{ParticipationService, ServiceFactory};
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct AppState {
    pub services: ServiceFactory,
    pub verifier: Arc<TokenVerifier>,
    pub rate_limiter: Option<Arc<RateLimitMiddleware>>,
}

impl AppState {
    /// Create application state from settings and initialized services
    pub fn new(settings: &Settings, services: ServiceFactory) -> Result<Self> {
        let rate_limiter = if settings.rate_limit.enabled {
            Some(Arc::new(RateLimitMiddleware::new(&settings.rate_limit)?))
        } else {
            None
        };

        Ok(Self {
            services,
            verifier: Arc::new(TokenVerifier::new(&settings.auth)),
            rate_limiter,
        })
    }

    pub fn participation(&self) -> &ParticipationService {
        &self.services.participation_service
    }

    /// Apply the per-user quota to a roster mutation
    pub fn check_rate_limit(&self, user_id: &UserId) -> Result<()> {
        match &self.rate_limiter {
            Some(limiter) => limiter.check_rate_limit(user_id),
            None => Ok(()),
        }
    }
}
