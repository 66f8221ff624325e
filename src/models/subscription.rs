use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{Cycle, PaletteColor, MUTED_GRAY};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct SubscriptionId(pub(crate) u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SubscriptionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Subscription {
    pub(crate) id: SubscriptionId,
    pub(crate) name: String,
    #[serde(with = "price_format")]
    pub(crate) price: Decimal,
    pub(crate) start_date: NaiveDate,
    pub(crate) cycle: Cycle,
    pub(crate) color: PaletteColor,
    #[serde(default)]
    pub(crate) cancelled: bool,
}

impl Subscription {
    pub(crate) fn is_active(&self) -> bool {
        !self.cancelled
    }

    /// Price normalized to one month: yearly prices are spread over 12 months.
    pub(crate) fn monthly_price(&self) -> Decimal {
        match self.cycle {
            Cycle::Monthly => self.price,
            Cycle::Yearly => self.price / Decimal::from(12),
        }
    }

    /// Label used for calendar bars, e.g. `Netflix ($15.49)`.
    pub(crate) fn title(&self) -> String {
        format!("{} (${})", self.name, self.price)
    }

    pub(crate) fn bar_style(&self) -> BarStyle {
        if self.cancelled {
            BarStyle {
                rgb: MUTED_GRAY,
                muted: true,
                struck_through: true,
            }
        } else {
            BarStyle {
                rgb: self.color.rgb(),
                muted: false,
                struck_through: false,
            }
        }
    }

    /// Checks the invariants serde cannot express on its own.
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        check_price(self.price)?;
        Ok(())
    }
}

/// How a subscription is drawn on the calendar and in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BarStyle {
    pub(crate) rgb: (u8, u8, u8),
    pub(crate) muted: bool,
    pub(crate) struck_through: bool,
}

pub(crate) fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Largest accepted price.
const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Parse a user-entered price. A leading `$` is tolerated.
pub(crate) fn parse_price(s: &str) -> Result<Decimal, ValidationError> {
    let cleaned = s.trim().trim_start_matches('$').trim();
    let price =
        Decimal::from_str(cleaned).map_err(|_| ValidationError::InvalidPrice(s.to_string()))?;
    check_price(price)
}

/// Prices are whole cents between zero and [`MAX_PRICE`]. Inside that range
/// the JSON number written for a price reads back as the same value.
fn check_price(price: Decimal) -> Result<Decimal, ValidationError> {
    let price = price.normalize();
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::NegativePrice(price));
    }
    if price.scale() > 2 {
        return Err(ValidationError::PricePrecision(price));
    }
    if price > MAX_PRICE {
        return Err(ValidationError::PriceTooLarge(price));
    }
    Ok(price)
}

pub(crate) fn parse_start_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// Prices travel as plain JSON numbers so exported files stay readable by
/// other tools. Parsing goes through the shortest float representation to
/// avoid binary noise like `15.4900000000000002`.
mod price_format {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub(super) fn serialize<S: Serializer>(
        price: &Decimal,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match price.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => Err(S::Error::custom(format!("price {price} is not representable"))),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Decimal, D::Error> {
        let value = f64::deserialize(deserializer)?;
        if !value.is_finite() {
            return Err(D::Error::custom("price must be a finite number"));
        }
        Decimal::from_str(&value.to_string()).map_err(D::Error::custom)
    }
}
