//! Expansion of subscriptions into calendar billing periods.
//!
//! Period boundaries are computed from the start date, not chained from the
//! previous boundary: boundary `k` is `start_date + k` cycles, with the day of
//! month clamped to the last day of shorter months. A subscription started on
//! Jan 31 therefore renews on Feb 29 (or 28), Mar 31, Apr 30 and so on, and a
//! yearly one started on Feb 29 renews on Feb 28 outside leap years.

use chrono::{Datelike, Months, NaiveDate};

use crate::models::{BillingPeriod, Subscription};

/// Upper bound on periods produced per subscription, whatever the horizon.
pub(crate) const MAX_PERIODS: usize = 100;

/// Billing periods of `sub` whose start lies before `horizon_end`, in order.
pub(crate) fn expand(sub: &Subscription, horizon_end: NaiveDate) -> Vec<BillingPeriod> {
    let mut periods = Vec::new();
    let mut cursor = sub.start_date;

    while cursor < horizon_end && periods.len() < MAX_PERIODS {
        let Some(next) = boundary(sub, periods.len() as u32 + 1) else {
            log::warn!("billing dates of subscription {} overflow the calendar", sub.id);
            break;
        };
        periods.push(BillingPeriod {
            subscription_id: sub.id,
            start: cursor,
            end: next,
        });
        cursor = next;
    }

    periods
}

/// Expand every subscription, keeping store order.
pub(crate) fn expand_all(subs: &[Subscription], horizon_end: NaiveDate) -> Vec<BillingPeriod> {
    subs.iter().flat_map(|s| expand(s, horizon_end)).collect()
}

/// Start of the `k`-th period after the first one.
fn boundary(sub: &Subscription, k: u32) -> Option<NaiveDate> {
    let months = sub.cycle.months().checked_mul(k)?;
    sub.start_date.checked_add_months(Months::new(months))
}

/// `today` moved forward by whole years, clamped like any other boundary.
pub(crate) fn horizon_from(today: NaiveDate, years: u32) -> NaiveDate {
    years
        .checked_mul(12)
        .and_then(|m| today.checked_add_months(Months::new(m)))
        .unwrap_or(NaiveDate::MAX)
}

/// First renewal strictly after `today`, if one happens within
/// [`MAX_PERIODS`] cycles.
pub(crate) fn next_renewal(sub: &Subscription, today: NaiveDate) -> Option<NaiveDate> {
    if sub.start_date > today {
        return Some(sub.start_date);
    }
    (1..=MAX_PERIODS as u32)
        .map_while(|k| boundary(sub, k))
        .find(|d| *d > today)
}

/// First and one-past-last day of a calendar month.
pub(crate) fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some((first, next))
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    month_bounds(year, month)
        .map(|(first, next)| (next - first).num_days() as u32)
        .unwrap_or(0)
}

/// Periods that share at least one day with the given month.
pub(crate) fn periods_in_month(
    periods: &[BillingPeriod],
    year: i32,
    month: u32,
) -> Vec<BillingPeriod> {
    let Some((first, next)) = month_bounds(year, month) else {
        return Vec::new();
    };
    periods
        .iter()
        .filter(|p| p.overlaps(first, next))
        .copied()
        .collect()
}

/// True when one of `periods` starts on `date`.
pub(crate) fn renews_on(periods: &[BillingPeriod], date: NaiveDate) -> bool {
    periods.iter().any(|p| p.start == date)
}

/// Shift a `(year, month)` pair by `delta` months.
pub(crate) fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

pub(crate) fn year_month(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}
