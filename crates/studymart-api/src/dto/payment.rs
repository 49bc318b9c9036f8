//! Payment and order DTOs
//!
//! The order response never carries the OTP code; the code reaches the
//! buyer only through the notification channel.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use studymart_escrow::CaptureOutcome;
use studymart_types::{money::CURRENCY, EscrowOrder};

/// Request to start a purchase
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    /// Material being bought
    pub material_id: Uuid,
    /// Buying student
    pub buyer_id: Uuid,
    /// Selling student; must own the material
    pub seller_id: Uuid,
}

/// Request to report delivery of the material
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MarkDeliveredRequest {
    /// Order being delivered
    pub order_id: Uuid,
}

/// Request to confirm delivery with the OTP
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ConfirmDeliveryRequest {
    /// Order being confirmed
    pub order_id: Uuid,
    /// Six-digit code sent to the buyer
    #[validate(length(equal = 6, message = "must be a 6-digit code"))]
    pub otp: String,
}

/// An escrow order as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub order_id: Uuid,
    /// Human-facing receipt number
    pub receipt_no: i64,
    /// Gateway order handle the client completes payment against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_order_id: Option<String>,
    pub material_id: Uuid,
    pub seller_id: Uuid,
    pub buyer_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EscrowOrder> for OrderResponse {
    fn from(order: EscrowOrder) -> Self {
        Self {
            order_id: order.id.as_uuid(),
            receipt_no: order.receipt_no,
            gateway_order_id: order.gateway_order_id,
            material_id: order.material_id.as_uuid(),
            seller_id: order.seller_id.as_uuid(),
            buyer_id: order.buyer_id.as_uuid(),
            amount: order.amount,
            currency: CURRENCY.to_string(),
            state: order.state.as_str().to_string(),
            payment_deadline: order.payment_deadline,
            delivery_deadline: order.delivery_deadline,
            otp_expires_at: order.otp_expires_at,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Acknowledgement returned to the gateway for a webhook delivery
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub success: bool,
    /// What the event did: `applied`, `duplicate`, or `ignored`
    pub outcome: String,
}

impl From<&CaptureOutcome> for WebhookAck {
    fn from(outcome: &CaptureOutcome) -> Self {
        let outcome = match outcome {
            CaptureOutcome::Applied(_) => "applied",
            CaptureOutcome::AlreadyProcessed => "duplicate",
            CaptureOutcome::Ignored => "ignored",
        };
        Self {
            success: true,
            outcome: outcome.to_string(),
        }
    }
}
