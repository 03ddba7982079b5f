use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use gymdesk_shared::dates::hhmm;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Individual,
    Pair,
    Group,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Individual => "individual",
            SessionType::Pair => "pair",
            SessionType::Group => "group",
        }
    }
}

impl FromStr for SessionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" => Ok(SessionType::Individual),
            "pair" => Ok(SessionType::Pair),
            "group" => Ok(SessionType::Group),
            other => Err(CoreError::ValidationError(format!("unknown session type '{other}'"))),
        }
    }
}

/// Reservation status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Completed,
    CancelledByClient,
    CancelledByCenter,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Completed => "completed",
            ReservationStatus::CancelledByClient => "cancelled_by_client",
            ReservationStatus::CancelledByCenter => "cancelled_by_center",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ReservationStatus::CancelledByClient | ReservationStatus::CancelledByCenter)
    }

    pub fn is_terminal(&self) -> bool {
        self.is_cancelled() || *self == ReservationStatus::Completed
    }

    /// Whether a reservation in this status is charged against the client's
    /// monthly sessions. Late client cancellations are; center cancellations
    /// are not.
    pub fn consumes_session(&self) -> bool {
        *self != ReservationStatus::CancelledByCenter
    }

    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        match (self, next) {
            (Pending, Confirmed) => true,
            (Confirmed, Completed) => true,
            (Pending | Confirmed, CancelledByClient | CancelledByCenter) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReservationStatus::Pending),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "completed" => Ok(ReservationStatus::Completed),
            "cancelled_by_client" => Ok(ReservationStatus::CancelledByClient),
            "cancelled_by_center" => Ok(ReservationStatus::CancelledByCenter),
            other => Err(CoreError::ValidationError(format!("unknown reservation status '{other}'"))),
        }
    }
}

/// A concrete booking of a trainer on a calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reservation {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub client_id: Option<Uuid>,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub session_type: SessionType,
    pub status: ReservationStatus,
    /// Template that produced this reservation, if any.
    pub source_template_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(
        trainer_id: Uuid,
        client_id: Option<Uuid>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        session_type: SessionType,
    ) -> CoreResult<Self> {
        if end_time <= start_time {
            return Err(CoreError::ValidationError(format!(
                "end time {} must be after start time {}",
                end_time.format("%H:%M"),
                start_time.format("%H:%M")
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            trainer_id,
            client_id,
            date,
            start_time,
            end_time,
            session_type,
            status: ReservationStatus::Pending,
            source_template_id: None,
            created_at: Utc::now(),
        })
    }

    /// Move to `next`, rejecting transitions out of terminal statuses.
    pub fn transition(&mut self, next: ReservationStatus) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }

    /// Both rows hold the same trainer at overlapping times. Cancelled rows hold nothing.
    pub fn double_books(&self, other: &Reservation) -> bool {
        !self.status.is_cancelled()
            && !other.status.is_cancelled()
            && self.trainer_id == other.trainer_id
            && self.date == other.date
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }
}
