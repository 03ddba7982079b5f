use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

/// A client's training plan: the weekdays they are contracted to train.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub client_id: Uuid,
    /// Weekday indices, 1 = Monday .. 7 = Sunday.
    pub training_days: Vec<u8>,
    pub active_from: NaiveDate,
    pub active_until: Option<NaiveDate>,
}

impl Subscription {
    pub fn new(
        client_id: Uuid,
        mut training_days: Vec<u8>,
        active_from: NaiveDate,
        active_until: Option<NaiveDate>,
    ) -> CoreResult<Self> {
        if let Some(bad) = training_days.iter().find(|d| !(1..=7).contains(*d)) {
            return Err(CoreError::ValidationError(format!("training day {bad} is not a weekday index")));
        }
        if matches!(active_until, Some(until) if until < active_from) {
            return Err(CoreError::ValidationError("subscription ends before it starts".to_string()));
        }
        training_days.sort_unstable();
        training_days.dedup();

        Ok(Self {
            client_id,
            training_days,
            active_from,
            active_until,
        })
    }

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        date >= self.active_from && self.active_until.map_or(true, |until| date <= until)
    }
}

/// Persisted per client/month corrections to the session balance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaLedgerEntry {
    pub client_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub carried_over: i32,
    pub adjustment: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_validation() {
        let from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let sub = Subscription::new(Uuid::new_v4(), vec![3, 1, 3], from, None).unwrap();
        assert_eq!(sub.training_days, vec![1, 3]);
        assert!(sub.is_active_on(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));

        assert!(Subscription::new(Uuid::new_v4(), vec![0], from, None).is_err());
        assert!(Subscription::new(Uuid::new_v4(), vec![1], from, NaiveDate::from_ymd_opt(2024, 1, 1)).is_err());
    }
}
