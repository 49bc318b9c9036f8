//! PostgreSQL-backed store implementations
//!
//! Thin adapters over the `studymart-db` repositories. CAS semantics come
//! from the conditional UPDATE queries in the repos.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use studymart_db::{Database, DbError, EscrowOrderRepo, NewEscrowOrder};
use studymart_types::{EscrowOrder, MaterialId, OrderId, StudentId};

use super::{
    CatalogStore, MaterialListing, NewOrder, OrderStore, StoreError, StoreResult, StudentContact,
};

impl From<DbError> for StoreError {
    fn from(e: DbError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

fn into_domain(row: studymart_db::DbEscrowOrder) -> StoreResult<EscrowOrder> {
    row.into_domain()
        .map_err(|e| StoreError::Backend(e.to_string()))
}

fn into_domain_opt(
    row: Option<studymart_db::DbEscrowOrder>,
) -> StoreResult<Option<EscrowOrder>> {
    row.map(into_domain).transpose()
}

/// Order store backed by the `escrow_orders` table
pub struct PgOrderStore {
    repo: EscrowOrderRepo,
}

impl PgOrderStore {
    pub fn new(db: &Database) -> Self {
        Self {
            repo: db.escrow_order_repo(),
        }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert_pending(&self, order: NewOrder) -> StoreResult<EscrowOrder> {
        let row = self
            .repo
            .insert_pending(&NewEscrowOrder {
                id: order.id.as_uuid(),
                material_id: order.material_id.as_uuid(),
                seller_id: order.seller_id.as_uuid(),
                buyer_id: order.buyer_id.as_uuid(),
                amount: order.amount,
            })
            .await?;
        into_domain(row)
    }

    async fn find(&self, id: OrderId) -> StoreResult<Option<EscrowOrder>> {
        into_domain_opt(self.repo.find_by_id(id.as_uuid()).await?)
    }

    async fn find_by_gateway_order(
        &self,
        gateway_order_id: &str,
    ) -> StoreResult<Option<EscrowOrder>> {
        into_domain_opt(self.repo.find_by_gateway_order_id(gateway_order_id).await?)
    }

    async fn finalize_hold(
        &self,
        id: OrderId,
        gateway_order_id: &str,
        payment_deadline: DateTime<Utc>,
    ) -> StoreResult<Option<EscrowOrder>> {
        into_domain_opt(
            self.repo
                .finalize_hold(id.as_uuid(), gateway_order_id, payment_deadline)
                .await?,
        )
    }

    async fn mark_paid(
        &self,
        id: OrderId,
        capture_id: &str,
        delivery_deadline: DateTime<Utc>,
    ) -> StoreResult<Option<EscrowOrder>> {
        into_domain_opt(
            self.repo
                .mark_paid(id.as_uuid(), capture_id, delivery_deadline)
                .await?,
        )
    }

    async fn mark_delivered(
        &self,
        id: OrderId,
        otp_code: &str,
        otp_expires_at: DateTime<Utc>,
    ) -> StoreResult<Option<EscrowOrder>> {
        into_domain_opt(
            self.repo
                .mark_delivered(id.as_uuid(), otp_code, otp_expires_at)
                .await?,
        )
    }

    async fn complete(&self, id: OrderId) -> StoreResult<Option<EscrowOrder>> {
        into_domain_opt(self.repo.complete(id.as_uuid()).await?)
    }

    async fn refund(&self, id: OrderId) -> StoreResult<Option<EscrowOrder>> {
        into_domain_opt(self.repo.refund(id.as_uuid()).await?)
    }

    async fn cancel(&self, id: OrderId) -> StoreResult<Option<EscrowOrder>> {
        into_domain_opt(self.repo.cancel(id.as_uuid()).await?)
    }

    async fn mark_settled(&self, id: OrderId) -> StoreResult<Option<EscrowOrder>> {
        into_domain_opt(self.repo.mark_settled(id.as_uuid()).await?)
    }

    async fn unsettled(&self) -> StoreResult<Vec<EscrowOrder>> {
        self.repo
            .find_unsettled()
            .await?
            .into_iter()
            .map(into_domain)
            .collect()
    }

    async fn sweepable(
        &self,
        now: DateTime<Utc>,
        pending_hold_cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<EscrowOrder>> {
        self.repo
            .find_sweepable(now, pending_hold_cutoff)
            .await?
            .into_iter()
            .map(into_domain)
            .collect()
    }
}

/// Catalog lookups backed by the materials and students tables
pub struct PgCatalog {
    db: Arc<Database>,
}

impl PgCatalog {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    async fn material(&self, id: MaterialId) -> StoreResult<Option<MaterialListing>> {
        let material = self.db.material_repo().find_by_id(id.as_uuid()).await?;
        Ok(material.map(|m| MaterialListing {
            id: m.id.into(),
            seller_id: m.seller_id.into(),
            title: m.title,
            price: m.price,
            active: m.active,
        }))
    }

    async fn student(&self, id: StudentId) -> StoreResult<Option<StudentContact>> {
        let student = self.db.student_repo().find_by_id(id.as_uuid()).await?;
        Ok(student.map(|s| StudentContact {
            id: s.id.into(),
            email: s.email,
        }))
    }
}
