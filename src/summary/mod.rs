use rust_decimal::Decimal;

use crate::models::{Cycle, Subscription};

/// Sum of the monthly-normalized prices of all non-cancelled subscriptions.
///
/// Yearly prices are added up first and divided by 12 once, so the result
/// does not depend on the order of `subs`.
pub(crate) fn monthly_total(subs: &[Subscription]) -> Decimal {
    let (monthly, yearly) = subs
        .iter()
        .filter(|s| s.is_active())
        .fold((Decimal::ZERO, Decimal::ZERO), |(m, y), s| match s.cycle {
            Cycle::Monthly => (m + s.price, y),
            Cycle::Yearly => (m, y + s.price),
        });
    monthly + yearly / Decimal::from(12)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) active: usize,
    pub(crate) cancelled: usize,
    pub(crate) monthly_total: Decimal,
    pub(crate) yearly_total: Decimal,
}

impl Summary {
    pub(crate) fn of(subs: &[Subscription]) -> Self {
        let monthly = monthly_total(subs);
        let cancelled = subs.iter().filter(|s| s.cancelled).count();
        Self {
            active: subs.len() - cancelled,
            cancelled,
            monthly_total: monthly,
            yearly_total: monthly * Decimal::from(12),
        }
    }
}

#[cfg(test)]
mod tests;
