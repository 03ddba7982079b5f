use chrono::Datelike;
use gymdesk_core::{QuotaLedgerEntry, Reservation, Subscription};
use gymdesk_shared::dates::{month_bounds, weekday_index, DateError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Monthly session balance of a client. Derived, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionQuotaInfo {
    pub client_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub contracted: i32,
    pub carried_over: i32,
    pub used: i32,
    pub adjustment: i32,
    pub balance: i32,
}

impl SessionQuotaInfo {
    /// Sessions that roll into the next month. A negative balance is not carried.
    pub fn carry_forward(&self) -> i32 {
        self.balance.max(0)
    }
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// First month whose quota feeds (year, month): the latest ledger month at or
/// before it, or the subscription's first month, whichever is later.
pub fn chain_start(
    year: i32,
    month: u32,
    subscription: Option<&Subscription>,
    ledger: &[QuotaLedgerEntry],
) -> (i32, u32) {
    let target = (year, month);
    let subscribed = subscription.map(|sub| (sub.active_from.year(), sub.active_from.month()));
    let settled = ledger
        .iter()
        .map(|entry| (entry.year, entry.month))
        .filter(|ym| *ym <= target)
        .max();

    subscribed
        .into_iter()
        .chain(settled)
        .max()
        .map_or(target, |start| start.min(target))
}

/// Days of the month that match the subscription's training pattern while it is active.
pub fn contracted_sessions(subscription: &Subscription, year: i32, month: u32) -> Result<i32, DateError> {
    let (first, last) = month_bounds(year, month)?;
    let count = first
        .iter_days()
        .take_while(|day| *day <= last)
        .filter(|day| subscription.is_active_on(*day))
        .filter(|day| subscription.training_days.contains(&weekday_index(*day)))
        .count();
    Ok(count as i32)
}

/// Reservations charged against the month's sessions.
pub fn used_sessions(reservations: &[Reservation], year: i32, month: u32) -> i32 {
    reservations
        .iter()
        .filter(|r| r.date.year() == year && r.date.month() == month)
        .filter(|r| r.status.consumes_session())
        .count() as i32
}

/// Computes the month's quota. The ledger's carried-over value wins over
/// `carried_fallback`, which callers derive from the previous month.
pub fn session_quota(
    client_id: Uuid,
    year: i32,
    month: u32,
    subscription: Option<&Subscription>,
    ledger: Option<&QuotaLedgerEntry>,
    carried_fallback: i32,
    reservations: &[Reservation],
) -> Result<SessionQuotaInfo, DateError> {
    let contracted = match subscription {
        Some(sub) => contracted_sessions(sub, year, month)?,
        None => {
            month_bounds(year, month)?;
            0
        }
    };
    let carried_over = ledger.map_or(carried_fallback, |entry| entry.carried_over);
    let adjustment = ledger.map_or(0, |entry| entry.adjustment);
    let used = used_sessions(reservations, year, month);

    Ok(SessionQuotaInfo {
        client_id,
        year,
        month,
        contracted,
        carried_over,
        used,
        adjustment,
        balance: contracted + carried_over + adjustment - used,
    })
}

/// Quota of (year, month), rolling each month's remaining balance forward
/// from `start`. Months with a ledger entry take its carried-over value.
pub fn rolling_session_quota(
    client_id: Uuid,
    start: (i32, u32),
    year: i32,
    month: u32,
    subscription: Option<&Subscription>,
    ledger: &[QuotaLedgerEntry],
    reservations: &[Reservation],
) -> Result<SessionQuotaInfo, DateError> {
    month_bounds(year, month)?;

    let target = (year, month);
    let mut current = start.min(target);
    let mut carried = 0;
    loop {
        let entry = ledger
            .iter()
            .find(|entry| (entry.year, entry.month) == current);
        let info = session_quota(client_id, current.0, current.1, subscription, entry, carried, reservations)?;
        if current == target {
            return Ok(info);
        }
        carried = info.carry_forward();
        current = next_month(current.0, current.1);
    }
}
