//! Data models module
//!
//! This module contains all data structures used by the participation core

pub mod event;
pub mod participation;

// Re-export commonly used models
pub use event::{EventCapacitySnapshot, EventPayload, EventRow, RawCapacity, parse_capacity};
pub use participation::{
    EventId, UserId, ParticipationStatus, Feedback, ParticipationRecord, ParticipationRow,
    InsertOutcome, RemoveOutcome, JoinOutcome, LeaveOutcome, ParticipationStatusView, Roster,
    UserParticipations,
};
