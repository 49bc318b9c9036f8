//! Persistence seams for the orchestrator
//!
//! The orchestrator talks to storage through these traits so the state
//! machine can be exercised against the in-memory store in tests and the
//! PostgreSQL repositories in production. Every transition method is a
//! compare-and-set: it succeeds only if the order is still in the expected
//! state, and returns `None` when the caller lost the race.

mod memory;
mod pg;

pub use memory::{MemoryCatalog, MemoryOrderStore};
pub use pg::{PgCatalog, PgOrderStore};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use studymart_types::{EscrowOrder, MaterialId, OrderId, StudentId};

/// Storage errors surfaced to the orchestrator
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage failure: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Fields for a provisional order row
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: OrderId,
    pub material_id: MaterialId,
    pub seller_id: StudentId,
    pub buyer_id: StudentId,
    pub amount: Decimal,
}

/// Durable order lifecycle storage
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a provisional order in `pending_hold`
    async fn insert_pending(&self, order: NewOrder) -> StoreResult<EscrowOrder>;

    async fn find(&self, id: OrderId) -> StoreResult<Option<EscrowOrder>>;

    async fn find_by_gateway_order(
        &self,
        gateway_order_id: &str,
    ) -> StoreResult<Option<EscrowOrder>>;

    /// CAS `pending_hold -> created`
    async fn finalize_hold(
        &self,
        id: OrderId,
        gateway_order_id: &str,
        payment_deadline: DateTime<Utc>,
    ) -> StoreResult<Option<EscrowOrder>>;

    /// CAS `created -> paid`
    async fn mark_paid(
        &self,
        id: OrderId,
        capture_id: &str,
        delivery_deadline: DateTime<Utc>,
    ) -> StoreResult<Option<EscrowOrder>>;

    /// CAS `paid`/`delivered -> delivered`, installing a fresh OTP that
    /// supersedes any previous unconsumed code
    async fn mark_delivered(
        &self,
        id: OrderId,
        otp_code: &str,
        otp_expires_at: DateTime<Utc>,
    ) -> StoreResult<Option<EscrowOrder>>;

    /// CAS `delivered -> completed`; the row starts unsettled until the
    /// gateway capture is confirmed
    async fn complete(&self, id: OrderId) -> StoreResult<Option<EscrowOrder>>;

    /// CAS `paid`/`delivered -> refunded`; the row starts unsettled until
    /// the gateway refund is confirmed
    async fn refund(&self, id: OrderId) -> StoreResult<Option<EscrowOrder>>;

    /// Record that the gateway accepted the capture or refund
    async fn mark_settled(&self, id: OrderId) -> StoreResult<Option<EscrowOrder>>;

    /// Terminal orders with an unconfirmed gateway money movement, oldest
    /// first
    async fn unsettled(&self) -> StoreResult<Vec<EscrowOrder>>;

    /// CAS `pending_hold`/`created -> cancelled`
    async fn cancel(&self, id: OrderId) -> StoreResult<Option<EscrowOrder>>;

    /// Non-terminal orders whose deadline has passed; `pending_hold` rows
    /// are eligible once created before `pending_hold_cutoff`
    async fn sweepable(
        &self,
        now: DateTime<Utc>,
        pending_hold_cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<EscrowOrder>>;
}

/// A material listing as the orchestrator sees it
#[derive(Debug, Clone)]
pub struct MaterialListing {
    pub id: MaterialId,
    pub seller_id: StudentId,
    pub title: String,
    pub price: Decimal,
    pub active: bool,
}

/// Buyer contact details for OTP delivery
#[derive(Debug, Clone)]
pub struct StudentContact {
    pub id: StudentId,
    pub email: String,
}

/// Read-only catalog lookups backing purchase preconditions
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn material(&self, id: MaterialId) -> StoreResult<Option<MaterialListing>>;

    async fn student(&self, id: StudentId) -> StoreResult<Option<StudentContact>>;
}
