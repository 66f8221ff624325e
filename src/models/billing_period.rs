use chrono::NaiveDate;

use super::SubscriptionId;

/// One renewal cycle of a subscription, as the half-open range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BillingPeriod {
    pub(crate) subscription_id: SubscriptionId,
    pub(crate) start: NaiveDate,
    pub(crate) end: NaiveDate,
}

impl BillingPeriod {
    pub(crate) fn len_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub(crate) fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// True when the period shares at least one day with `[from, to)`.
    pub(crate) fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start < to && from < self.end
    }
}
