mod billing_period;
mod cycle;
mod palette;
mod subscription;

pub(crate) use billing_period::BillingPeriod;
pub(crate) use cycle::Cycle;
pub(crate) use palette::{PaletteColor, MUTED_GRAY};
pub(crate) use subscription::{
    parse_price, parse_start_date, validate_name, BarStyle, Subscription, SubscriptionId,
};
