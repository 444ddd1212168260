//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{SkillHubError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_participation_config(&settings.participation)?;
    validate_events_config(&settings.events)?;
    validate_auth_config(&settings.auth)?;
    validate_rate_limit_config(&settings.rate_limit)?;
    validate_logging_config(&settings.logging)?;

    if uses_database(settings) {
        validate_database_config(&settings.database)?;
    }

    Ok(())
}

/// Whether any configured component needs the PostgreSQL pool
pub fn uses_database(settings: &Settings) -> bool {
    settings.participation.store == "postgres" || settings.events.source == "database"
}

fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    config.bind_address.parse::<std::net::SocketAddr>().map_err(|e| {
        SkillHubError::Config(format!("Invalid bind address {}: {}", config.bind_address, e))
    })?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(SkillHubError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(SkillHubError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(SkillHubError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate event directory configuration
fn validate_events_config(config: &super::EventsConfig) -> Result<()> {
    match config.source.as_str() {
        "database" => {}
        "http" => {
            let api_url = config.api_url.as_deref().unwrap_or_default();
            if api_url.is_empty() {
                return Err(SkillHubError::Config(
                    "Event API URL is required when events.source = \"http\"".to_string()
                ));
            }
            url::Url::parse(api_url)?;
        }
        other => {
            return Err(SkillHubError::Config(
                format!("Unknown events source: {}. Valid sources: database, http", other)
            ));
        }
    }

    if config.timeout_seconds == 0 {
        return Err(SkillHubError::Config(
            "Event lookup timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate token verification configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.is_empty() {
        return Err(SkillHubError::Config(
            "JWT secret is required".to_string()
        ));
    }

    Ok(())
}

/// Validate participation core configuration
fn validate_participation_config(config: &super::ParticipationConfig) -> Result<()> {
    if !["postgres", "memory"].contains(&config.store.as_str()) {
        return Err(SkillHubError::Config(
            format!("Unknown roster store: {}. Valid stores: postgres, memory", config.store)
        ));
    }

    if config.store_timeout_ms == 0 {
        return Err(SkillHubError::Config(
            "Store timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

fn validate_rate_limit_config(config: &super::RateLimitConfig) -> Result<()> {
    if config.enabled && config.per_minute == 0 {
        return Err(SkillHubError::Config(
            "Rate limit quota must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(SkillHubError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(SkillHubError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
