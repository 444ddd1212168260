//! Event model
//!
//! Events are owned by the event collaborator. This core only ever sees a
//! read-only capacity snapshot, resolved fresh for every operation.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::participation::EventId;
use crate::utils::errors::CapacityError;

/// Capacity of an event at the time of the lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCapacitySnapshot {
    pub event_id: EventId,
    pub capacity: u32,
}

/// Raw `events` row; capacity is stored as free text by the event CRUD layer
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: String,
    pub capacity: Option<String>,
}

/// Capacity as the event API may encode it
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawCapacity {
    Integer(i64),
    Text(String),
    Other(serde_json::Value),
}

/// Event document returned by the event API
#[derive(Debug, Clone, Deserialize)]
pub struct EventPayload {
    pub id: Option<String>,
    #[serde(default)]
    pub capacity: Option<RawCapacity>,
}

impl RawCapacity {
    pub fn to_capacity(&self) -> Result<u32, CapacityError> {
        match self {
            RawCapacity::Integer(value) => integer_capacity(*value),
            RawCapacity::Text(text) => parse_capacity(text),
            RawCapacity::Other(serde_json::Value::Null) => Err(CapacityError::Missing),
            RawCapacity::Other(value) => Err(CapacityError::NotANumber(value.to_string())),
        }
    }
}

/// Normalize a textual capacity into a non-negative integer.
///
/// Accepts surrounding whitespace and an optional leading `+`. Anything that
/// is not a whole base-10 number is rejected rather than compared as NaN.
pub fn parse_capacity(raw: &str) -> Result<u32, CapacityError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CapacityError::Missing);
    }

    let (negative, digits) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CapacityError::NotANumber(trimmed.to_string()));
    }

    if negative && digits.bytes().any(|b| b != b'0') {
        return Err(CapacityError::Negative(trimmed.to_string()));
    }

    digits
        .parse::<u32>()
        .map_err(|_| CapacityError::TooLarge(trimmed.to_string()))
}

fn integer_capacity(value: i64) -> Result<u32, CapacityError> {
    if value < 0 {
        return Err(CapacityError::Negative(value.to_string()));
    }
    u32::try_from(value).map_err(|_| CapacityError::TooLarge(value.to_string()))
}
