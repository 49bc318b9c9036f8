//! In-memory store implementations for tests
//!
//! Mirrors the CAS semantics of the PostgreSQL repositories: every
//! transition checks the current state under the map lock and returns
//! `None` when the order has already moved on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use studymart_types::{EscrowOrder, MaterialId, OrderId, OrderState, StudentId};

use super::{
    CatalogStore, MaterialListing, NewOrder, OrderStore, StoreResult, StudentContact,
};

/// Order store over a locked map, for exercising the state machine without
/// a database
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<HashMap<OrderId, EscrowOrder>>,
    receipt_seq: AtomicI64,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot an order outside the trait, for test assertions
    pub fn get(&self, id: OrderId) -> Option<EscrowOrder> {
        self.orders.lock().unwrap().get(&id).cloned()
    }

    fn transition<F>(&self, id: OrderId, from: &[OrderState], apply: F) -> Option<EscrowOrder>
    where
        F: FnOnce(&mut EscrowOrder),
    {
        let mut orders = self.orders.lock().unwrap();
        let order = orders.get_mut(&id)?;
        if !from.contains(&order.state) {
            return None;
        }
        apply(order);
        order.updated_at = Utc::now();
        Some(order.clone())
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert_pending(&self, order: NewOrder) -> StoreResult<EscrowOrder> {
        let now = Utc::now();
        let row = EscrowOrder {
            id: order.id,
            receipt_no: self.receipt_seq.fetch_add(1, Ordering::SeqCst) + 1,
            gateway_order_id: None,
            capture_id: None,
            material_id: order.material_id,
            seller_id: order.seller_id,
            buyer_id: order.buyer_id,
            amount: order.amount,
            state: OrderState::PendingHold,
            settled: true,
            otp_code: None,
            otp_expires_at: None,
            payment_deadline: None,
            delivery_deadline: None,
            created_at: now,
            updated_at: now,
        };
        self.orders.lock().unwrap().insert(order.id, row.clone());
        Ok(row)
    }

    async fn find(&self, id: OrderId) -> StoreResult<Option<EscrowOrder>> {
        Ok(self.orders.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_gateway_order(
        &self,
        gateway_order_id: &str,
    ) -> StoreResult<Option<EscrowOrder>> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .find(|o| o.gateway_order_id.as_deref() == Some(gateway_order_id))
            .cloned())
    }

    async fn finalize_hold(
        &self,
        id: OrderId,
        gateway_order_id: &str,
        payment_deadline: DateTime<Utc>,
    ) -> StoreResult<Option<EscrowOrder>> {
        Ok(self.transition(id, &[OrderState::PendingHold], |o| {
            o.state = OrderState::Created;
            o.gateway_order_id = Some(gateway_order_id.to_string());
            o.payment_deadline = Some(payment_deadline);
        }))
    }

    async fn mark_paid(
        &self,
        id: OrderId,
        capture_id: &str,
        delivery_deadline: DateTime<Utc>,
    ) -> StoreResult<Option<EscrowOrder>> {
        Ok(self.transition(id, &[OrderState::Created], |o| {
            o.state = OrderState::Paid;
            o.capture_id = Some(capture_id.to_string());
            o.delivery_deadline = Some(delivery_deadline);
        }))
    }

    async fn mark_delivered(
        &self,
        id: OrderId,
        otp_code: &str,
        otp_expires_at: DateTime<Utc>,
    ) -> StoreResult<Option<EscrowOrder>> {
        Ok(
            self.transition(id, &[OrderState::Paid, OrderState::Delivered], |o| {
                o.state = OrderState::Delivered;
                o.otp_code = Some(otp_code.to_string());
                o.otp_expires_at = Some(otp_expires_at);
            }),
        )
    }

    async fn complete(&self, id: OrderId) -> StoreResult<Option<EscrowOrder>> {
        Ok(self.transition(id, &[OrderState::Delivered], |o| {
            o.state = OrderState::Completed;
            o.settled = false;
            o.otp_code = None;
            o.otp_expires_at = None;
        }))
    }

    async fn refund(&self, id: OrderId) -> StoreResult<Option<EscrowOrder>> {
        Ok(
            self.transition(id, &[OrderState::Paid, OrderState::Delivered], |o| {
                o.state = OrderState::Refunded;
                o.settled = false;
                o.otp_code = None;
                o.otp_expires_at = None;
            }),
        )
    }

    async fn cancel(&self, id: OrderId) -> StoreResult<Option<EscrowOrder>> {
        Ok(
            self.transition(id, &[OrderState::PendingHold, OrderState::Created], |o| {
                o.state = OrderState::Cancelled;
            }),
        )
    }

    async fn mark_settled(&self, id: OrderId) -> StoreResult<Option<EscrowOrder>> {
        let mut orders = self.orders.lock().unwrap();
        Ok(orders.get_mut(&id).map(|o| {
            o.settled = true;
            o.updated_at = Utc::now();
            o.clone()
        }))
    }

    async fn unsettled(&self) -> StoreResult<Vec<EscrowOrder>> {
        let orders = self.orders.lock().unwrap();
        let mut due: Vec<EscrowOrder> = orders.values().filter(|o| !o.settled).cloned().collect();
        due.sort_by_key(|o| o.created_at);
        Ok(due)
    }

    async fn sweepable(
        &self,
        now: DateTime<Utc>,
        pending_hold_cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<EscrowOrder>> {
        let orders = self.orders.lock().unwrap();
        let mut due: Vec<EscrowOrder> = orders
            .values()
            .filter(|o| match o.state {
                OrderState::PendingHold => o.created_at < pending_hold_cutoff,
                OrderState::Created => o.payment_deadline.map(|d| d < now).unwrap_or(false),
                OrderState::Paid => o.delivery_deadline.map(|d| d < now).unwrap_or(false),
                OrderState::Delivered => o.otp_expires_at.map(|e| e < now).unwrap_or(false),
                _ => false,
            })
            .cloned()
            .collect();
        due.sort_by_key(|o| o.created_at);
        Ok(due)
    }
}

/// Catalog over fixed maps, for tests
#[derive(Default)]
pub struct MemoryCatalog {
    materials: Mutex<HashMap<MaterialId, MaterialListing>>,
    students: Mutex<HashMap<StudentId, StudentContact>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_material(&self, listing: MaterialListing) {
        self.materials.lock().unwrap().insert(listing.id, listing);
    }

    pub fn insert_student(&self, contact: StudentContact) {
        self.students.lock().unwrap().insert(contact.id, contact);
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn material(&self, id: MaterialId) -> StoreResult<Option<MaterialListing>> {
        Ok(self.materials.lock().unwrap().get(&id).cloned())
    }

    async fn student(&self, id: StudentId) -> StoreResult<Option<StudentContact>> {
        Ok(self.students.lock().unwrap().get(&id).cloned())
    }
}
