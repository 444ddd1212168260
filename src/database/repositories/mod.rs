//! Database repositories module
//!
//! This module contains the PostgreSQL implementations of the roster store
//! and the event directory

pub mod event;
pub mod participation;

// Re-export repositories
pub use event::PgEventDirectory;
pub use participation::PgRosterStore;
