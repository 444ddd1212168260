//! Test helpers module
//!
//! Fixtures shared by the integration tests: in-memory services, a served
//! router with token minting, and a PostgreSQL test database.

#![allow(dead_code)]

pub mod database_helper;
pub mod test_app;
pub mod test_data;

pub use database_helper::*;
pub use test_app::*;
pub use test_data::*;
