//! Participation model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::errors::{ParticipationError, StoreError};
use crate::utils::helpers::validate_identifier;

/// Maximum length of a feedback comment, in characters
pub const MAX_FEEDBACK_COMMENT_LEN: usize = 1000;

/// Opaque identifier of an event, as issued by the event collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

/// Opaque identifier of an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl EventId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ParticipationError> {
        let raw = raw.into();
        validate_identifier("event id", &raw).map_err(ParticipationError::InvalidInput)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl UserId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ParticipationError> {
        let raw = raw.into();
        validate_identifier("user id", &raw).map_err(ParticipationError::InvalidInput)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a participation record.
///
/// Only `Registered` is produced by the participation service; the other
/// states are written by attendance tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipationStatus {
    Registered,
    Attended,
    Completed,
    Cancelled,
}

impl ParticipationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipationStatus::Registered => "registered",
            ParticipationStatus::Attended => "attended",
            ParticipationStatus::Completed => "completed",
            ParticipationStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ParticipationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" => Ok(ParticipationStatus::Registered),
            "attended" => Ok(ParticipationStatus::Attended),
            "completed" => Ok(ParticipationStatus::Completed),
            "cancelled" => Ok(ParticipationStatus::Cancelled),
            other => Err(format!("unknown participation status: {}", other)),
        }
    }
}

/// Post-event feedback left by a participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    rating: u8,
    comment: Option<String>,
}

impl Feedback {
    /// Build feedback, rejecting ratings outside 1..=5 and oversized comments
    pub fn new(rating: u8, comment: Option<String>) -> Result<Self, ParticipationError> {
        if !(1..=5).contains(&rating) {
            return Err(ParticipationError::InvalidInput(format!(
                "feedback rating must be between 1 and 5, got {}",
                rating
            )));
        }

        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        if let Some(ref c) = comment {
            if c.chars().count() > MAX_FEEDBACK_COMMENT_LEN {
                return Err(ParticipationError::InvalidInput(format!(
                    "feedback comment exceeds {} characters",
                    MAX_FEEDBACK_COMMENT_LEN
                )));
            }
        }

        Ok(Self { rating, comment })
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// One user's participation in one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationRecord {
    pub event_id: EventId,
    pub user_id: UserId,
    pub status: ParticipationStatus,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub feedback: Option<Feedback>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ParticipationRecord {
    /// A freshly admitted participant
    pub fn registered(event_id: EventId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            event_id,
            user_id,
            status: ParticipationStatus::Registered,
            check_in_time: None,
            check_out_time: None,
            feedback: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Raw `event_participations` row
#[derive(Debug, Clone, FromRow)]
pub struct ParticipationRow {
    pub event_id: String,
    pub user_id: String,
    pub status: String,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub feedback_rating: Option<i16>,
    pub feedback_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ParticipationRow> for ParticipationRecord {
    type Error = StoreError;

    fn try_from(row: ParticipationRow) -> Result<Self, Self::Error> {
        let corrupt = |e: ParticipationError| StoreError::CorruptRecord(e.to_string());

        let event_id = EventId::parse(row.event_id).map_err(corrupt)?;
        let user_id = UserId::parse(row.user_id).map_err(corrupt)?;
        let status = row
            .status
            .parse::<ParticipationStatus>()
            .map_err(StoreError::CorruptRecord)?;

        let feedback = match row.feedback_rating {
            Some(rating) => {
                let rating = u8::try_from(rating)
                    .map_err(|_| StoreError::CorruptRecord(format!("feedback rating {} out of range", rating)))?;
                Some(Feedback::new(rating, row.feedback_comment).map_err(corrupt)?)
            }
            None => None,
        };

        Ok(Self {
            event_id,
            user_id,
            status,
            check_in_time: row.check_in_time,
            check_out_time: row.check_out_time,
            feedback,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Result of an atomic insert-if-absent
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(ParticipationRecord),
    AlreadyExists,
}

/// Result of an idempotent delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// Successful join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinOutcome {
    pub participant_count: u64,
    pub capacity: u32,
}

/// Successful leave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveOutcome {
    pub participant_count: u64,
}

/// Answer to "am I in this event?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationStatusView {
    pub is_participating: bool,
    pub participant_count: u64,
    pub capacity: u32,
}

/// Roster of an event as served to organizer views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    pub participants: Vec<ParticipationRecord>,
    pub count: u64,
}

/// A user's own participations across events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserParticipations {
    pub participations: Vec<ParticipationRecord>,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, rating: Option<i16>) -> ParticipationRow {
        let now = Utc::now();
        ParticipationRow {
            event_id: "evt-42".to_string(),
            user_id: "user-7".to_string(),
            status: status.to_string(),
            check_in_time: None,
            check_out_time: None,
            feedback_rating: rating,
            feedback_comment: Some("  great session  ".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_identifier_parsing() {
        assert!(EventId::parse("65f1c2a9e4b0a1b2c3d4e5f6").is_ok());
        assert!(UserId::parse("auth0|user_01").is_ok());
        assert!(UserId::parse("user@example.com").is_ok());
        assert!(EventId::parse("").is_err());
        assert!(EventId::parse("has space").is_err());
        assert!(EventId::parse("x".repeat(129)).is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ParticipationStatus::Registered,
            ParticipationStatus::Attended,
            ParticipationStatus::Completed,
            ParticipationStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<ParticipationStatus>(), Ok(status));
        }
        assert!("pending".parse::<ParticipationStatus>().is_err());
    }

    #[test]
    fn test_feedback_validation() {
        assert!(Feedback::new(0, None).is_err());
        assert!(Feedback::new(6, None).is_err());
        assert!(Feedback::new(3, Some("x".repeat(MAX_FEEDBACK_COMMENT_LEN + 1))).is_err());

        let feedback = Feedback::new(5, Some("  ".to_string())).unwrap();
        assert_eq!(feedback.rating(), 5);
        assert_eq!(feedback.comment(), None);
    }

    #[test]
    fn test_row_conversion() {
        let record = ParticipationRecord::try_from(row("attended", Some(4))).unwrap();
        assert_eq!(record.status, ParticipationStatus::Attended);
        let feedback = record.feedback.unwrap();
        assert_eq!(feedback.rating(), 4);
        assert_eq!(feedback.comment(), Some("great session"));
    }

    #[test]
    fn test_corrupt_rows_are_rejected() {
        assert!(matches!(
            ParticipationRecord::try_from(row("pending", None)),
            Err(StoreError::CorruptRecord(_))
        ));
        assert!(matches!(
            ParticipationRecord::try_from(row("registered", Some(9))),
            Err(StoreError::CorruptRecord(_))
        ));
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = ParticipationRecord::registered(
            EventId::parse("evt-1").unwrap(),
            UserId::parse("user-1").unwrap(),
            Utc::now(),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["eventId"], "evt-1");
        assert_eq!(json["status"], "registered");
        assert!(json["checkInTime"].is_null());
    }
}
