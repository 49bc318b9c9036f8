//! Database models - mapped from PostgreSQL tables

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use studymart_types::{EscrowOrder, OrderState, TypesError};

// ============================================================================
// Student Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbStudent {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub college: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Material Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbMaterial {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub subject: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Escrow Order Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbEscrowOrder {
    pub id: Uuid,
    pub receipt_no: i64,
    pub gateway_order_id: Option<String>,
    pub capture_id: Option<String>,
    pub material_id: Uuid,
    pub seller_id: Uuid,
    pub buyer_id: Uuid,
    pub amount: Decimal,
    pub state: String,
    pub settled: bool,
    pub otp_code: Option<String>,
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub payment_deadline: Option<DateTime<Utc>>,
    pub delivery_deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbEscrowOrder {
    /// Convert the row into the domain order, validating the state string.
    pub fn into_domain(self) -> Result<EscrowOrder, TypesError> {
        Ok(EscrowOrder {
            id: self.id.into(),
            receipt_no: self.receipt_no,
            gateway_order_id: self.gateway_order_id,
            capture_id: self.capture_id,
            material_id: self.material_id.into(),
            seller_id: self.seller_id.into(),
            buyer_id: self.buyer_id.into(),
            amount: self.amount,
            state: OrderState::parse(&self.state)?,
            settled: self.settled,
            otp_code: self.otp_code,
            otp_expires_at: self.otp_expires_at,
            payment_deadline: self.payment_deadline,
            delivery_deadline: self.delivery_deadline,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
