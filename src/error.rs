use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::SubscriptionId;

/// A field value that violates a subscription invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("invalid price: '{0}'")]
    InvalidPrice(String),

    #[error("price must not be negative: {0}")]
    NegativePrice(Decimal),

    #[error("price {0} has more than two decimal places")]
    PricePrecision(Decimal),

    #[error("price {0} is above the 1,000,000 limit")]
    PriceTooLarge(Decimal),

    #[error("invalid start date: '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("invalid billing cycle: '{0}' (expected monthly or yearly)")]
    InvalidCycle(String),

    #[error("'{0}' is not a palette color")]
    InvalidColor(String),
}

/// Why an imported snapshot was rejected. The store is never touched when
/// one of these is returned.
#[derive(Debug, Error)]
pub(crate) enum ImportError {
    #[error("file is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("expected a JSON array of subscriptions")]
    NotAnArray,

    #[error("entry {index} is not a subscription record: {source}")]
    Record {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("entry {index} is invalid: {source}")]
    Invalid {
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error("entry {index} reuses id {id}")]
    DuplicateId { index: usize, id: SubscriptionId },
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("no subscription with id {0}")]
    NotFound(SubscriptionId),

    #[error("failed to encode subscriptions")]
    Encode(#[source] serde_json::Error),

    #[error("failed to persist subscriptions")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub(crate) fn persistence(err: anyhow::Error) -> Self {
        Self::Persistence(err.into())
    }

    /// Errors caused by user input, as opposed to a failing backend.
    pub(crate) fn is_user_error(&self) -> bool {
        !matches!(self, Self::Encode(_) | Self::Persistence(_))
    }
}
