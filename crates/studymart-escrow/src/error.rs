//! Escrow operation errors
//!
//! The taxonomy mirrors what the HTTP layer needs: validation failures
//! enumerate every violated field at once, state conflicts carry the
//! current state, and upstream failures never expose raw gateway detail.

use studymart_types::OrderState;
use thiserror::Error;

/// Errors returned by escrow operations
#[derive(Debug, Error)]
pub enum EscrowError {
    /// One or more inputs failed validation. Carries every violation, not
    /// just the first.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Referenced order/material/student does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Operation is not valid for the order's current state
    #[error("Cannot {operation}: order is {current}")]
    StateConflict {
        operation: &'static str,
        current: OrderState,
    },

    /// Supplied OTP does not match the outstanding code
    #[error("Invalid OTP")]
    InvalidOtp,

    /// Correct OTP supplied after the confirmation window closed; the held
    /// payment has been refunded
    #[error("OTP expired; the payment has been refunded to the buyer")]
    OtpExpired,

    /// Webhook signature did not verify
    #[error("Invalid webhook signature")]
    InvalidSignature,

    /// Webhook payload could not be interpreted
    #[error("Malformed webhook event: {0}")]
    MalformedEvent(String),

    /// Gateway call failed
    #[error("Payment gateway error")]
    Gateway(#[from] studymart_gateway::GatewayError),

    /// Persistence failure
    #[error("Storage error: {0}")]
    Store(String),
}

impl From<crate::store::StoreError> for EscrowError {
    fn from(e: crate::store::StoreError) -> Self {
        EscrowError::Store(e.to_string())
    }
}

impl From<studymart_types::TypesError> for EscrowError {
    fn from(e: studymart_types::TypesError) -> Self {
        EscrowError::Validation(vec![e.to_string()])
    }
}

/// Result type for escrow operations
pub type EscrowResult<T> = Result<T, EscrowError>;
