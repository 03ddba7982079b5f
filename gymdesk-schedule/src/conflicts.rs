use chrono::{NaiveDate, NaiveTime};
use gymdesk_core::Reservation;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::projection::CandidateReservation;

/// Anything that occupies a trainer for a time range on a given day.
pub trait Booking {
    fn trainer_id(&self) -> Uuid;
    fn date(&self) -> NaiveDate;
    fn start_time(&self) -> NaiveTime;
    fn end_time(&self) -> NaiveTime;

    /// Inactive bookings never block anything.
    fn blocks_slot(&self) -> bool {
        true
    }

    /// Same trainer, same day and intersecting half-open ranges.
    /// The client is irrelevant: a trainer cannot be double-booked.
    fn collides_with<B: Booking + ?Sized>(&self, other: &B) -> bool {
        self.trainer_id() == other.trainer_id()
            && self.date() == other.date()
            && self.start_time() < other.end_time()
            && other.start_time() < self.end_time()
    }
}

impl Booking for Reservation {
    fn trainer_id(&self) -> Uuid {
        self.trainer_id
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn start_time(&self) -> NaiveTime {
        self.start_time
    }
    fn end_time(&self) -> NaiveTime {
        self.end_time
    }
    fn blocks_slot(&self) -> bool {
        !self.status.is_cancelled()
    }
}

impl Booking for CandidateReservation {
    fn trainer_id(&self) -> Uuid {
        self.trainer_id
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
    fn start_time(&self) -> NaiveTime {
        self.start_time
    }
    fn end_time(&self) -> NaiveTime {
        self.end_time
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictingWith {
    /// An existing reservation.
    Reservation { id: Uuid },
    /// An earlier slot of the same template projected onto the same week.
    Slot { index: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConflictCheck {
    pub candidate: CandidateReservation,
    pub conflict: bool,
    pub conflicting_with: Option<ConflictingWith>,
}

/// First blocking reservation in `existing` that collides with `booking`.
pub fn find_conflict<'a, B: Booking + ?Sized>(booking: &B, existing: &'a [Reservation]) -> Option<&'a Reservation> {
    existing
        .iter()
        .find(|reservation| reservation.blocks_slot() && reservation.collides_with(booking))
}

/// Flags every candidate that collides with an existing reservation.
/// When several collide, the first one in input order is reported.
pub fn check_conflicts(candidates: &[CandidateReservation], existing: &[Reservation]) -> Vec<ConflictCheck> {
    candidates
        .iter()
        .map(|candidate| {
            let hit = find_conflict(candidate, existing);
            ConflictCheck {
                candidate: candidate.clone(),
                conflict: hit.is_some(),
                conflicting_with: hit.map(|r| ConflictingWith::Reservation { id: r.id }),
            }
        })
        .collect()
}

/// [`check_conflicts`] plus collisions between slots of the same week: a
/// candidate that survives the existing-reservation check is still flagged
/// when it collides with an earlier surviving candidate.
pub fn resolve_week(candidates: &[CandidateReservation], existing: &[Reservation]) -> Vec<ConflictCheck> {
    let mut checks = check_conflicts(candidates, existing);

    for i in 0..checks.len() {
        if checks[i].conflict {
            continue;
        }
        let earlier = checks[..i]
            .iter()
            .find(|prev| !prev.conflict && prev.candidate.collides_with(&checks[i].candidate))
            .map(|prev| prev.candidate.slot_index);

        if let Some(index) = earlier {
            checks[i].conflict = true;
            checks[i].conflicting_with = Some(ConflictingWith::Slot { index });
        }
    }

    checks
}
