//! StudyMart Payment Gateway Adapter
//!
//! The escrow core treats the gateway as an opaque service: it creates
//! manual-capture holds, finalizes captures, and issues refunds, all keyed
//! by gateway-issued handles. Webhook callbacks are authenticated with an
//! HMAC-SHA256 signature over the raw payload.

pub mod http;
pub mod mock;
pub mod webhook;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::HttpGateway;
pub use mock::MockGateway;
pub use webhook::{WebhookEvent, WebhookVerifier, EVENT_PAYMENT_CAPTURED};

/// Gateway operation errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Request(String),

    #[error("Gateway rejected the operation: {status} {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Request(e.to_string())
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// A manual-capture hold created at the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayHold {
    /// Gateway-issued order handle the client completes payment against
    pub order_id: String,
    /// Held amount in minor units
    pub amount_minor: i64,
    /// ISO currency code
    pub currency: String,
}

/// Payment gateway operations used by the escrow orchestrator.
///
/// Implementations must be safe to call concurrently; the orchestrator
/// awaits these calls without holding any in-process lock.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hold (authorization without capture) for `amount_minor`.
    ///
    /// `reference` is the internal order id, attached as gateway metadata
    /// so orphaned holds can be reconciled.
    async fn create_hold(
        &self,
        amount_minor: i64,
        currency: &str,
        reference: &str,
    ) -> GatewayResult<GatewayHold>;

    /// Finalize a previously captured payment, transferring funds.
    async fn capture(&self, capture_id: &str, amount_minor: i64) -> GatewayResult<()>;

    /// Refund a held capture back to the buyer.
    async fn refund(&self, capture_id: &str) -> GatewayResult<()>;
}
