//! Escrow order types
//!
//! The escrow order is the sole entity of the payment core. Funds are held
//! by the gateway until the buyer confirms delivery with an OTP; the order
//! row tracks where in that lifecycle a purchase sits.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypesError;
use crate::{MaterialId, OrderId, StudentId};

/// State of an escrow order
///
/// The happy path is `PendingHold → Created → Paid → Delivered → Completed`.
/// `PendingHold` is the provisional state persisted before the gateway hold
/// is requested, so a crash mid-creation never leaves an untracked hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    /// Provisional row persisted before the gateway hold exists
    PendingHold,
    /// Gateway hold created, awaiting buyer payment
    Created,
    /// Payment captured by the gateway, awaiting seller delivery
    Paid,
    /// Seller marked delivery, OTP sent to the buyer
    Delivered,
    /// Buyer confirmed with OTP, capture finalized
    Completed,
    /// Hold refunded to the buyer
    Refunded,
    /// Order cancelled before payment
    Cancelled,
}

impl OrderState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Refunded | Self::Cancelled)
    }

    /// Check whether a transition to `next` follows the lifecycle graph.
    ///
    /// Transitions are monotonic; nothing moves an order backward.
    pub fn can_transition_to(&self, next: OrderState) -> bool {
        matches!(
            (self, next),
            (Self::PendingHold, Self::Created)
                | (Self::PendingHold, Self::Cancelled)
                | (Self::Created, Self::Paid)
                | (Self::Created, Self::Cancelled)
                | (Self::Paid, Self::Delivered)
                | (Self::Paid, Self::Refunded)
                | (Self::Delivered, Self::Completed)
                | (Self::Delivered, Self::Refunded)
        )
    }

    /// Stable string form used in the database `state` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingHold => "pending_hold",
            Self::Created => "created",
            Self::Paid => "paid",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::Refunded => "refunded",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse the database string form
    pub fn parse(s: &str) -> Result<Self, TypesError> {
        match s {
            "pending_hold" => Ok(Self::PendingHold),
            "created" => Ok(Self::Created),
            "paid" => Ok(Self::Paid),
            "delivered" => Ok(Self::Delivered),
            "completed" => Ok(Self::Completed),
            "refunded" => Ok(Self::Refunded),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(TypesError::UnknownState(other.to_string())),
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An escrow order
///
/// One row per purchase attempt. Terminal orders are retained for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscrowOrder {
    /// Internal order id
    pub id: OrderId,
    /// Human-facing sequence number, assigned atomically by the database
    pub receipt_no: i64,
    /// Gateway order handle; absent while the hold request is in flight
    pub gateway_order_id: Option<String>,
    /// Gateway capture id; set once payment is captured
    pub capture_id: Option<String>,
    /// Material being traded
    pub material_id: MaterialId,
    /// Selling student
    pub seller_id: StudentId,
    /// Buying student
    pub buyer_id: StudentId,
    /// Amount in major units, fixed at creation
    pub amount: Decimal,
    /// Current lifecycle state
    pub state: OrderState,
    /// Whether the terminal gateway money movement has been confirmed.
    /// `completed` and `refunded` rows start unsettled and are retried by
    /// the sweep until the gateway accepts the capture or refund.
    pub settled: bool,
    /// OTP code; present only while `delivered`
    pub otp_code: Option<String>,
    /// OTP expiry; present only while `delivered`
    pub otp_expires_at: Option<DateTime<Utc>>,
    /// Deadline for the buyer to complete payment (`created` orders)
    pub payment_deadline: Option<DateTime<Utc>>,
    /// Deadline for the seller to deliver (`paid` orders)
    pub delivery_deadline: Option<DateTime<Utc>>,
    /// When the order was created
    pub created_at: DateTime<Utc>,
    /// When the order was last updated
    pub updated_at: DateTime<Utc>,
}

impl EscrowOrder {
    /// Check whether the unpaid-order payment window has elapsed
    pub fn payment_overdue(&self, now: DateTime<Utc>) -> bool {
        self.state == OrderState::Created
            && self.payment_deadline.map(|d| d < now).unwrap_or(false)
    }

    /// Check whether the undelivered-order window has elapsed
    pub fn delivery_overdue(&self, now: DateTime<Utc>) -> bool {
        self.state == OrderState::Paid
            && self.delivery_deadline.map(|d| d < now).unwrap_or(false)
    }

    /// Check whether the OTP window has elapsed.
    ///
    /// Strict `now > expiry`: the code remains valid through the expiry
    /// instant itself and is expired one tick after.
    pub fn otp_expired(&self, now: DateTime<Utc>) -> bool {
        self.otp_expires_at.map(|e| now > e).unwrap_or(false)
    }
}
