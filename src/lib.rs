//! SkillHub participation service
//!
//! Lets authenticated users join and leave events on the SkillHub
//! event-discovery platform while respecting each event's capacity.
//! The library exposes the participation core, its storage backends and the
//! HTTP binding built on top of them.

#![allow(non_snake_case)]

pub mod config;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ParticipationError, Result, SkillHubError};

// Re-export main components for easy access
pub use handlers::router;
pub use services::{ParticipationService, RosterStore, ServiceFactory};
pub use state::AppState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
