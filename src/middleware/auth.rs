//! Authentication middleware
//!
//! Identities are issued by the external auth service as HS256-signed JWTs.
//! This module only verifies them and exposes the `sub` claim as the opaque
//! user id of the request.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::handlers::error::ApiError;
use crate::models::UserId;
use crate::state::AppState;
use crate::utils::errors::{SkillHubError, Result};

/// Claims the participation service relies on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Verifies bearer tokens issued by the auth service
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a new TokenVerifier instance
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_seconds;
        if let Some(ref issuer) = config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Verify a raw token and return the user it identifies
    pub fn verify(&self, token: &str) -> Result<UserId> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            debug!(error = %e, "Token verification failed");
            SkillHubError::Authentication(format!("Invalid token: {}", e))
        })?;

        UserId::parse(data.claims.sub)
            .map_err(|e| SkillHubError::Authentication(format!("Invalid subject: {}", e)))
    }

    /// Verify an `Authorization` header value of the form `Bearer <token>`
    pub fn verify_header(&self, header: Option<&str>) -> Result<UserId> {
        let header = header.ok_or_else(|| {
            SkillHubError::Authentication("Missing Authorization header".to_string())
        })?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| SkillHubError::Authentication("Expected a bearer token".to_string()))?;

        self.verify(token)
    }
}

/// The authenticated caller of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        match state.verifier.verify_header(header) {
            Ok(user_id) => Ok(CurrentUser(user_id)),
            Err(e) => {
                warn!(path = %parts.uri.path(), error = %e, "Rejected unauthenticated request");
                Err(ApiError::from(e))
            }
        }
    }
}
