use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use gymdesk_core::{Reservation, ReservationStatus, SessionType, SlotDefinition, WeeklyTemplate};
use gymdesk_shared::dates::{hhmm, monday_of};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ScheduleError;

/// A reservation projected from a template slot onto a concrete week.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateReservation {
    /// Position of the originating slot in the template.
    pub slot_index: usize,
    pub trainer_id: Uuid,
    pub client_id: Option<Uuid>,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub session_type: SessionType,
}

impl CandidateReservation {
    /// Booked slots start confirmed; open slots wait for a client.
    pub fn into_reservation(self, template_id: Uuid) -> Reservation {
        let status = if self.client_id.is_some() {
            ReservationStatus::Confirmed
        } else {
            ReservationStatus::Pending
        };

        Reservation {
            id: Uuid::new_v4(),
            trainer_id: self.trainer_id,
            client_id: self.client_id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            session_type: self.session_type,
            status,
            source_template_id: Some(template_id),
            created_at: Utc::now(),
        }
    }
}

pub fn validate_slot(index: usize, slot: &SlotDefinition) -> Result<(), ScheduleError> {
    if !(1..=5).contains(&slot.weekday) {
        return Err(ScheduleError::InvalidTemplate {
            slot: index,
            reason: format!("weekday {} is outside Monday..Friday", slot.weekday),
        });
    }
    if slot.end_time <= slot.start_time {
        return Err(ScheduleError::InvalidTemplate {
            slot: index,
            reason: format!(
                "end {} is not after start {}",
                slot.end_time.format("%H:%M"),
                slot.start_time.format("%H:%M")
            ),
        });
    }
    Ok(())
}

pub fn validate_template(template: &WeeklyTemplate) -> Result<(), ScheduleError> {
    template
        .slots
        .iter()
        .enumerate()
        .try_for_each(|(index, slot)| validate_slot(index, slot))
}

/// Maps every slot of `template` onto the week starting at `target_monday`,
/// keeping slot order. Pure: nothing is read or written.
pub fn project(
    template: &WeeklyTemplate,
    target_monday: NaiveDate,
) -> Result<Vec<CandidateReservation>, ScheduleError> {
    let monday = monday_of(target_monday);

    template
        .slots
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            validate_slot(index, slot)?;
            Ok(CandidateReservation {
                slot_index: index,
                trainer_id: slot.trainer_id,
                client_id: slot.client_id,
                date: monday + Duration::days(i64::from(slot.weekday) - 1),
                start_time: slot.start_time,
                end_time: slot.end_time,
                session_type: slot.session_type,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn slot(weekday: u8, start: NaiveTime, end: NaiveTime, client: Option<Uuid>) -> SlotDefinition {
        SlotDefinition {
            trainer_id: Uuid::from_u128(1),
            weekday,
            start_time: start,
            end_time: end,
            client_id: client,
            session_type: SessionType::Individual,
        }
    }

    fn template(slots: Vec<SlotDefinition>) -> WeeklyTemplate {
        WeeklyTemplate::new("Test".to_string(), d(2025, 6, 2), slots)
    }

    #[test]
    fn test_projection_maps_weekdays_in_order() {
        let client = Some(Uuid::from_u128(7));
        let tpl = template(vec![
            slot(5, t(18, 0), t(19, 0), None),
            slot(1, t(9, 0), t(10, 0), client),
            slot(3, t(12, 30), t(13, 15), None),
        ]);

        let candidates = project(&tpl, d(2025, 6, 9)).unwrap();
        let dates: Vec<_> = candidates.iter().map(|c| c.date).collect();
        assert_eq!(dates, vec![d(2025, 6, 13), d(2025, 6, 9), d(2025, 6, 11)]);
        assert_eq!(candidates[1].client_id, client);
        assert_eq!(candidates[2].start_time, t(12, 30));
        assert_eq!(candidates.iter().map(|c| c.slot_index).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_projections_differ_only_in_date() {
        let tpl = template(vec![
            slot(1, t(9, 0), t(10, 0), Some(Uuid::from_u128(3))),
            slot(4, t(17, 0), t(18, 0), None),
        ]);

        let first = project(&tpl, d(2025, 6, 2)).unwrap();
        let second = project(&tpl, d(2025, 9, 15)).unwrap();
        for (a, b) in first.iter().zip(&second) {
            assert_ne!(a.date, b.date);
            assert_eq!((a.trainer_id, a.client_id, a.start_time, a.end_time), (b.trainer_id, b.client_id, b.start_time, b.end_time));
            assert_eq!(a.session_type, b.session_type);
        }
    }

    #[test]
    fn test_non_monday_target_is_normalized() {
        let tpl = template(vec![slot(2, t(9, 0), t(10, 0), None)]);
        let candidates = project(&tpl, d(2025, 6, 12)).unwrap();
        assert_eq!(candidates[0].date, d(2025, 6, 10));
    }

    #[test]
    fn test_invalid_slots_fail_at_projection() {
        let weekend = template(vec![slot(1, t(9, 0), t(10, 0), None), slot(6, t(9, 0), t(10, 0), None)]);
        match project(&weekend, d(2025, 6, 2)) {
            Err(ScheduleError::InvalidTemplate { slot, .. }) => assert_eq!(slot, 1),
            other => panic!("expected invalid template, got {other:?}"),
        }

        let inverted = template(vec![slot(2, t(10, 0), t(10, 0), None)]);
        assert!(matches!(project(&inverted, d(2025, 6, 2)), Err(ScheduleError::InvalidTemplate { slot: 0, .. })));
    }

    #[test]
    fn test_into_reservation_status_depends_on_client() {
        let template_id = Uuid::new_v4();
        let tpl = template(vec![slot(1, t(9, 0), t(10, 0), Some(Uuid::new_v4())), slot(2, t(9, 0), t(10, 0), None)]);
        let mut candidates = project(&tpl, d(2025, 6, 2)).unwrap().into_iter();

        let booked = candidates.next().unwrap().into_reservation(template_id);
        assert_eq!(booked.status, ReservationStatus::Confirmed);
        assert_eq!(booked.source_template_id, Some(template_id));

        let open = candidates.next().unwrap().into_reservation(template_id);
        assert_eq!(open.status, ReservationStatus::Pending);
    }
}
