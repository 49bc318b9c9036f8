//! Error types shared across the type layer

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced while constructing or converting domain types
#[derive(Debug, Clone, Error)]
pub enum TypesError {
    /// Amount must be strictly positive
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Amount has precision below one minor unit
    #[error("Amount {0} has precision finer than one minor unit")]
    SubMinorPrecision(Decimal),

    /// Amount does not fit the gateway's integer minor units
    #[error("Amount {0} overflows gateway minor units")]
    AmountOverflow(Decimal),

    /// Unknown order state string from persistence
    #[error("Unknown order state: {0}")]
    UnknownState(String),
}
