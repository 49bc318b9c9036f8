//! Full-lifecycle escrow tests against the in-memory store and mock gateway

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

use studymart_escrow::store::{
    MaterialListing, MemoryCatalog, MemoryOrderStore, OrderStore, StudentContact,
};
use studymart_escrow::{CaptureOutcome, EscrowConfig, EscrowError, EscrowService};
use studymart_gateway::mock::{GatewayCall, MockGateway};
use studymart_gateway::WebhookVerifier;
use studymart_notify::RecordingSender;
use studymart_types::{MaterialId, OrderId, OrderState, StudentId};

const WEBHOOK_SECRET: &str = "whsec_test";

struct Harness {
    service: EscrowService,
    orders: Arc<MemoryOrderStore>,
    catalog: Arc<MemoryCatalog>,
    gateway: Arc<MockGateway>,
    notifier: Arc<RecordingSender>,
    verifier: WebhookVerifier,
    seller: StudentId,
    buyer: StudentId,
    material: MaterialId,
}

fn harness() -> Harness {
    let orders = Arc::new(MemoryOrderStore::new());
    let catalog = Arc::new(MemoryCatalog::new());
    let gateway = Arc::new(MockGateway::new());
    let notifier = Arc::new(RecordingSender::new());
    let verifier = WebhookVerifier::new(WEBHOOK_SECRET);

    let seller = StudentId::new();
    let buyer = StudentId::new();
    let material = MaterialId::new();
    catalog.insert_student(StudentContact {
        id: seller,
        email: "seller@example.edu".to_string(),
    });
    catalog.insert_student(StudentContact {
        id: buyer,
        email: "buyer@example.edu".to_string(),
    });
    catalog.insert_material(MaterialListing {
        id: material,
        seller_id: seller,
        title: "Calculus II notes".to_string(),
        price: dec!(500),
        active: true,
    });

    let service = EscrowService::new(
        orders.clone(),
        catalog.clone(),
        gateway.clone(),
        notifier.clone(),
        verifier.clone(),
        EscrowConfig::default(),
    );

    Harness {
        service,
        orders,
        catalog,
        gateway,
        notifier,
        verifier,
        seller,
        buyer,
        material,
    }
}

impl Harness {
    fn capture_body(&self, gateway_order_id: &str, payment_id: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "event": "payment.captured",
            "payload": { "order_id": gateway_order_id, "payment_id": payment_id }
        }))
        .unwrap()
    }

    async fn send_capture(&self, gateway_order_id: &str, payment_id: &str) -> CaptureOutcome {
        let body = self.capture_body(gateway_order_id, payment_id);
        let signature = self.verifier.sign(&body);
        self.service.confirm_capture(&body, &signature).await.unwrap()
    }

    fn stored_otp(&self, order_id: OrderId) -> String {
        self.orders.get(order_id).unwrap().otp_code.unwrap()
    }
}

#[tokio::test]
async fn test_happy_path_releases_escrow() {
    let h = harness();

    let order = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();
    assert_eq!(order.state, OrderState::Created);
    assert_eq!(order.amount, dec!(500));
    assert!(order.payment_deadline.is_some());
    let gateway_order = order.gateway_order_id.clone().unwrap();

    let outcome = h.send_capture(&gateway_order, "pay_1").await;
    assert!(matches!(outcome, CaptureOutcome::Applied(_)));
    let paid = h.orders.get(order.id).unwrap();
    assert_eq!(paid.state, OrderState::Paid);
    assert_eq!(paid.capture_id.as_deref(), Some("pay_1"));
    assert!(paid.delivery_deadline.is_some());

    let delivered = h.service.mark_delivered(order.id).await.unwrap();
    assert_eq!(delivered.state, OrderState::Delivered);
    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "buyer@example.edu");
    assert_eq!(sent[0].otp_code.len(), 6);

    let completed = h
        .service
        .confirm_delivery(order.id, &sent[0].otp_code)
        .await
        .unwrap();
    assert_eq!(completed.state, OrderState::Completed);
    assert!(completed.otp_code.is_none());

    let calls = h.gateway.calls();
    assert!(matches!(
        calls[0],
        GatewayCall::CreateHold { amount_minor: 50_000, .. }
    ));
    assert!(calls.iter().any(|c| matches!(
        c,
        GatewayCall::Capture { capture_id, amount_minor: 50_000 } if capture_id == "pay_1"
    )));
}

#[tokio::test]
async fn test_amount_fixed_at_creation() {
    let h = harness();
    let order = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();

    // Reprice the listing after the order exists.
    h.catalog.insert_material(MaterialListing {
        id: h.material,
        seller_id: h.seller,
        title: "Calculus II notes".to_string(),
        price: dec!(900),
        active: true,
    });

    let gateway_order = order.gateway_order_id.clone().unwrap();
    h.send_capture(&gateway_order, "pay_1").await;
    h.service.mark_delivered(order.id).await.unwrap();
    let otp = h.stored_otp(order.id);
    let completed = h.service.confirm_delivery(order.id, &otp).await.unwrap();

    assert_eq!(completed.amount, dec!(500));
    assert!(h
        .gateway
        .calls()
        .iter()
        .any(|c| matches!(c, GatewayCall::Capture { amount_minor: 50_000, .. })));
}

#[tokio::test]
async fn test_purchase_validation_reports_all_violations() {
    let h = harness();
    h.catalog.insert_material(MaterialListing {
        id: h.material,
        seller_id: h.seller,
        title: "Calculus II notes".to_string(),
        price: dec!(500),
        active: false,
    });

    // Inactive material, purchased by its own seller.
    let err = h
        .service
        .initiate_purchase(h.material, h.seller, h.seller)
        .await
        .unwrap_err();
    match err {
        EscrowError::Validation(violations) => {
            assert_eq!(violations.len(), 2);
            assert!(violations.iter().any(|v| v.contains("no longer listed")));
            assert!(violations.iter().any(|v| v.contains("same student")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_material_rejected() {
    let h = harness();
    let err = h
        .service
        .initiate_purchase(MaterialId::new(), h.buyer, h.seller)
        .await
        .unwrap_err();
    assert!(matches!(err, EscrowError::Validation(_)));
}

#[tokio::test]
async fn test_mismatched_seller_rejected() {
    let h = harness();
    let err = h
        .service
        .initiate_purchase(h.material, h.buyer, StudentId::new())
        .await
        .unwrap_err();
    match err {
        EscrowError::Validation(violations) => {
            assert!(violations.iter().any(|v| v.contains("does not own")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn test_hold_failure_cancels_provisional_order() {
    let h = harness();
    h.gateway.fail_holds(true);

    let err = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap_err();
    assert!(matches!(err, EscrowError::Gateway(_)));

    // The provisional row was retired, not leaked.
    let cancelled = h
        .orders
        .sweepable(Utc::now() + Duration::days(1), Utc::now() + Duration::days(1))
        .await
        .unwrap();
    assert!(cancelled.is_empty());
}

#[tokio::test]
async fn test_webhook_bad_signature_rejected() {
    let h = harness();
    let order = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();
    let body = h.capture_body(&order.gateway_order_id.clone().unwrap(), "pay_1");

    let err = h
        .service
        .confirm_capture(&body, "deadbeef")
        .await
        .unwrap_err();
    assert!(matches!(err, EscrowError::InvalidSignature));
    assert_eq!(h.orders.get(order.id).unwrap().state, OrderState::Created);
}

#[tokio::test]
async fn test_webhook_duplicate_and_unknown_are_acked() {
    let h = harness();
    let order = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();
    let gateway_order = order.gateway_order_id.clone().unwrap();

    assert!(matches!(
        h.send_capture(&gateway_order, "pay_1").await,
        CaptureOutcome::Applied(_)
    ));
    // Redelivery of the same event.
    assert!(matches!(
        h.send_capture(&gateway_order, "pay_1").await,
        CaptureOutcome::AlreadyProcessed
    ));
    // Event for an order we never created.
    assert!(matches!(
        h.send_capture("order_elsewhere", "pay_2").await,
        CaptureOutcome::Ignored
    ));

    let paid = h.orders.get(order.id).unwrap();
    assert_eq!(paid.state, OrderState::Paid);
    assert_eq!(paid.capture_id.as_deref(), Some("pay_1"));
}

#[tokio::test]
async fn test_capture_event_without_payment_id_is_malformed() {
    let h = harness();
    let body = serde_json::to_vec(&serde_json::json!({
        "event": "payment.captured",
        "payload": { "order_id": "order_mock_0" }
    }))
    .unwrap();
    let signature = h.verifier.sign(&body);

    let err = h.service.confirm_capture(&body, &signature).await.unwrap_err();
    assert!(matches!(err, EscrowError::MalformedEvent(_)));
}

#[tokio::test]
async fn test_mark_delivered_requires_paid_order() {
    let h = harness();
    let order = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();

    let err = h.service.mark_delivered(order.id).await.unwrap_err();
    assert!(matches!(
        err,
        EscrowError::StateConflict { current: OrderState::Created, .. }
    ));
}

#[tokio::test]
async fn test_remarking_supersedes_previous_otp() {
    let h = harness();
    let order = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();
    h.send_capture(&order.gateway_order_id.clone().unwrap(), "pay_1").await;

    h.service.mark_delivered(order.id).await.unwrap();
    let first_otp = h.stored_otp(order.id);
    h.service.mark_delivered(order.id).await.unwrap();
    let second_otp = h.stored_otp(order.id);

    if first_otp != second_otp {
        let err = h.service.confirm_delivery(order.id, &first_otp).await.unwrap_err();
        assert!(matches!(err, EscrowError::InvalidOtp));
    }
    let completed = h.service.confirm_delivery(order.id, &second_otp).await.unwrap();
    assert_eq!(completed.state, OrderState::Completed);
    assert_eq!(h.notifier.sent().len(), 2);
}

#[tokio::test]
async fn test_wrong_otp_rejected_without_side_effects() {
    let h = harness();
    let order = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();
    h.send_capture(&order.gateway_order_id.clone().unwrap(), "pay_1").await;
    h.service.mark_delivered(order.id).await.unwrap();

    let real = h.stored_otp(order.id);
    let wrong = if real == "000000" { "000001" } else { "000000" };
    let err = h.service.confirm_delivery(order.id, wrong).await.unwrap_err();
    assert!(matches!(err, EscrowError::InvalidOtp));

    // Still delivered, still confirmable with the real code.
    assert_eq!(h.orders.get(order.id).unwrap().state, OrderState::Delivered);
    assert!(h.service.confirm_delivery(order.id, &real).await.is_ok());
}

#[tokio::test]
async fn test_expired_otp_refunds_buyer() {
    let h = harness();
    let order = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();
    h.send_capture(&order.gateway_order_id.clone().unwrap(), "pay_1").await;
    h.service.mark_delivered(order.id).await.unwrap();

    // Backdate the OTP expiry past the window.
    let otp = h.stored_otp(order.id);
    h.orders
        .mark_delivered(order.id, &otp, Utc::now() - Duration::seconds(1))
        .await
        .unwrap();

    let err = h.service.confirm_delivery(order.id, &otp).await.unwrap_err();
    assert!(matches!(err, EscrowError::OtpExpired));

    let refunded = h.orders.get(order.id).unwrap();
    assert_eq!(refunded.state, OrderState::Refunded);
    assert!(refunded.otp_code.is_none());
    assert!(h.gateway.calls().iter().any(|c| matches!(
        c,
        GatewayCall::Refund { capture_id } if capture_id == "pay_1"
    )));
}

#[tokio::test]
async fn test_confirm_on_terminal_order_is_state_conflict() {
    let h = harness();
    let order = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();
    h.send_capture(&order.gateway_order_id.clone().unwrap(), "pay_1").await;
    h.service.mark_delivered(order.id).await.unwrap();
    let otp = h.stored_otp(order.id);
    h.service.confirm_delivery(order.id, &otp).await.unwrap();

    let err = h.service.confirm_delivery(order.id, &otp).await.unwrap_err();
    assert!(matches!(
        err,
        EscrowError::StateConflict { current: OrderState::Completed, .. }
    ));
}

#[tokio::test]
async fn test_sweep_cancels_unpaid_and_refunds_undelivered() {
    let h = harness();

    // Unpaid order past its payment deadline.
    let unpaid = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();

    // Paid order past its delivery deadline.
    let paid = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();
    h.send_capture(&paid.gateway_order_id.clone().unwrap(), "pay_2").await;

    // Delivered order whose OTP window lapsed.
    let delivered = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();
    h.send_capture(&delivered.gateway_order_id.clone().unwrap(), "pay_3").await;
    h.service.mark_delivered(delivered.id).await.unwrap();

    // A fresh order the sweep must leave alone.
    let fresh = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();

    let far_future = Utc::now() + Duration::days(30);
    let report = h.service.sweep(far_future).await.unwrap();
    assert_eq!(report.cancelled, 2); // unpaid + fresh, both past the window
    assert_eq!(report.refunded, 2);
    assert_eq!(report.failed, 0);

    assert_eq!(h.orders.get(unpaid.id).unwrap().state, OrderState::Cancelled);
    assert_eq!(h.orders.get(paid.id).unwrap().state, OrderState::Refunded);
    assert_eq!(h.orders.get(delivered.id).unwrap().state, OrderState::Refunded);
    assert_eq!(h.orders.get(fresh.id).unwrap().state, OrderState::Cancelled);

    let refunds: Vec<_> = h
        .gateway
        .calls()
        .into_iter()
        .filter(|c| matches!(c, GatewayCall::Refund { .. }))
        .collect();
    assert_eq!(refunds.len(), 2);

    // A second pass finds nothing left to do.
    let report = h.service.sweep(far_future).await.unwrap();
    assert_eq!(report, studymart_escrow::SweepReport::default());
}

#[tokio::test]
async fn test_sweep_within_windows_is_a_noop() {
    let h = harness();
    let order = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();

    let report = h.service.sweep(Utc::now()).await.unwrap();
    assert_eq!(report, studymart_escrow::SweepReport::default());
    assert_eq!(h.orders.get(order.id).unwrap().state, OrderState::Created);
}

#[tokio::test]
async fn test_sweep_isolates_per_order_failures() {
    let h = harness();

    let a = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();
    h.send_capture(&a.gateway_order_id.clone().unwrap(), "pay_a").await;
    let b = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();

    // Gateway refunds fail; the row still moves to refunded but stays
    // unsettled, and cancellations are unaffected.
    h.gateway.fail_refunds(true);
    let report = h.service.sweep(Utc::now() + Duration::days(30)).await.unwrap();
    assert_eq!(report.cancelled, 1);
    assert_eq!(report.refunded, 0);
    assert_eq!(report.failed, 1);
    let a_row = h.orders.get(a.id).unwrap();
    assert_eq!(a_row.state, OrderState::Refunded);
    assert!(!a_row.settled);
    assert_eq!(h.orders.get(b.id).unwrap().state, OrderState::Cancelled);
}

#[tokio::test]
async fn test_failed_refund_retried_until_gateway_accepts() {
    let h = harness();
    let order = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();
    h.send_capture(&order.gateway_order_id.clone().unwrap(), "pay_1").await;

    let far = Utc::now() + Duration::days(30);
    h.gateway.fail_refunds(true);
    let report = h.service.sweep(far).await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(h.orders.get(order.id).unwrap().state, OrderState::Refunded);

    // Still failing: the order stays unsettled and no refund reaches the
    // gateway.
    let report = h.service.sweep(far).await.unwrap();
    assert_eq!(report.failed, 1);
    assert!(!h.orders.get(order.id).unwrap().settled);
    assert!(h
        .gateway
        .calls()
        .iter()
        .all(|c| !matches!(c, GatewayCall::Refund { .. })));

    // Gateway recovers; the next pass pushes the refund through once.
    h.gateway.fail_refunds(false);
    let report = h.service.sweep(far).await.unwrap();
    assert_eq!(report.settled, 1);
    assert_eq!(report.failed, 0);
    assert!(h.orders.get(order.id).unwrap().settled);
    let refunds = h
        .gateway
        .calls()
        .iter()
        .filter(|c| matches!(c, GatewayCall::Refund { .. }))
        .count();
    assert_eq!(refunds, 1);

    // Settled orders drop out of later passes.
    let report = h.service.sweep(far).await.unwrap();
    assert_eq!(report, studymart_escrow::SweepReport::default());
}

#[tokio::test]
async fn test_failed_capture_payout_retried_by_sweep() {
    let h = harness();
    let order = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();
    h.send_capture(&order.gateway_order_id.clone().unwrap(), "pay_1").await;
    h.service.mark_delivered(order.id).await.unwrap();
    let otp = h.stored_otp(order.id);

    // Confirmation still releases the escrow; the payout stays pending.
    h.gateway.fail_captures(true);
    let completed = h.service.confirm_delivery(order.id, &otp).await.unwrap();
    assert_eq!(completed.state, OrderState::Completed);
    assert!(!completed.settled);

    h.gateway.fail_captures(false);
    let report = h.service.sweep(Utc::now()).await.unwrap();
    assert_eq!(report.settled, 1);
    assert!(h.orders.get(order.id).unwrap().settled);
    let captures = h
        .gateway
        .calls()
        .iter()
        .filter(|c| matches!(c, GatewayCall::Capture { .. }))
        .count();
    assert_eq!(captures, 1);
}

#[tokio::test]
async fn test_lost_cas_fires_no_gateway_calls() {
    let h = harness();
    let order = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();
    h.send_capture(&order.gateway_order_id.clone().unwrap(), "pay_1").await;
    h.service.mark_delivered(order.id).await.unwrap();
    let otp = h.stored_otp(order.id);
    h.service.confirm_delivery(order.id, &otp).await.unwrap();

    let captures_before = h
        .gateway
        .calls()
        .iter()
        .filter(|c| matches!(c, GatewayCall::Capture { .. }))
        .count();

    // The order is already completed; the sweep and a repeat confirmation
    // must not touch the gateway again.
    h.service.sweep(Utc::now() + Duration::days(30)).await.unwrap();
    let _ = h.service.confirm_delivery(order.id, &otp).await;

    let captures_after = h
        .gateway
        .calls()
        .iter()
        .filter(|c| matches!(c, GatewayCall::Capture { .. } | GatewayCall::Refund { .. }))
        .count();
    assert_eq!(captures_before, captures_after);
}

/// Store that refunds the order just before the completion CAS, forcing
/// the confirming caller to lose the race.
struct RefundBeforeComplete {
    inner: Arc<MemoryOrderStore>,
}

#[async_trait::async_trait]
impl OrderStore for RefundBeforeComplete {
    async fn insert_pending(
        &self,
        order: studymart_escrow::store::NewOrder,
    ) -> studymart_escrow::store::StoreResult<studymart_types::EscrowOrder> {
        self.inner.insert_pending(order).await
    }

    async fn find(
        &self,
        id: OrderId,
    ) -> studymart_escrow::store::StoreResult<Option<studymart_types::EscrowOrder>> {
        self.inner.find(id).await
    }

    async fn find_by_gateway_order(
        &self,
        gateway_order_id: &str,
    ) -> studymart_escrow::store::StoreResult<Option<studymart_types::EscrowOrder>> {
        self.inner.find_by_gateway_order(gateway_order_id).await
    }

    async fn finalize_hold(
        &self,
        id: OrderId,
        gateway_order_id: &str,
        payment_deadline: chrono::DateTime<Utc>,
    ) -> studymart_escrow::store::StoreResult<Option<studymart_types::EscrowOrder>> {
        self.inner
            .finalize_hold(id, gateway_order_id, payment_deadline)
            .await
    }

    async fn mark_paid(
        &self,
        id: OrderId,
        capture_id: &str,
        delivery_deadline: chrono::DateTime<Utc>,
    ) -> studymart_escrow::store::StoreResult<Option<studymart_types::EscrowOrder>> {
        self.inner.mark_paid(id, capture_id, delivery_deadline).await
    }

    async fn mark_delivered(
        &self,
        id: OrderId,
        otp_code: &str,
        otp_expires_at: chrono::DateTime<Utc>,
    ) -> studymart_escrow::store::StoreResult<Option<studymart_types::EscrowOrder>> {
        self.inner.mark_delivered(id, otp_code, otp_expires_at).await
    }

    async fn complete(
        &self,
        id: OrderId,
    ) -> studymart_escrow::store::StoreResult<Option<studymart_types::EscrowOrder>> {
        self.inner.refund(id).await?;
        self.inner.complete(id).await
    }

    async fn refund(
        &self,
        id: OrderId,
    ) -> studymart_escrow::store::StoreResult<Option<studymart_types::EscrowOrder>> {
        self.inner.refund(id).await
    }

    async fn cancel(
        &self,
        id: OrderId,
    ) -> studymart_escrow::store::StoreResult<Option<studymart_types::EscrowOrder>> {
        self.inner.cancel(id).await
    }

    async fn mark_settled(
        &self,
        id: OrderId,
    ) -> studymart_escrow::store::StoreResult<Option<studymart_types::EscrowOrder>> {
        self.inner.mark_settled(id).await
    }

    async fn unsettled(
        &self,
    ) -> studymart_escrow::store::StoreResult<Vec<studymart_types::EscrowOrder>> {
        self.inner.unsettled().await
    }

    async fn sweepable(
        &self,
        now: chrono::DateTime<Utc>,
        pending_hold_cutoff: chrono::DateTime<Utc>,
    ) -> studymart_escrow::store::StoreResult<Vec<studymart_types::EscrowOrder>> {
        self.inner.sweepable(now, pending_hold_cutoff).await
    }
}

#[tokio::test]
async fn test_lost_completion_race_reports_current_state() {
    let h = harness();
    let order = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();
    h.send_capture(&order.gateway_order_id.clone().unwrap(), "pay_1").await;
    h.service.mark_delivered(order.id).await.unwrap();
    let otp = h.stored_otp(order.id);

    let racing = EscrowService::new(
        Arc::new(RefundBeforeComplete { inner: h.orders.clone() }),
        h.catalog.clone(),
        h.gateway.clone(),
        h.notifier.clone(),
        h.verifier.clone(),
        EscrowConfig::default(),
    );

    // The refund wins underneath the confirmation; the conflict names the
    // state the order actually ended up in, not the one the caller saw.
    let err = racing.confirm_delivery(order.id, &otp).await.unwrap_err();
    assert!(matches!(
        err,
        EscrowError::StateConflict { current: OrderState::Refunded, .. }
    ));
    assert_eq!(h.orders.get(order.id).unwrap().state, OrderState::Refunded);
}

#[tokio::test]
async fn test_receipt_numbers_are_sequential() {
    let h = harness();
    let first = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();
    let second = h.service.initiate_purchase(h.material, h.buyer, h.seller).await.unwrap();
    assert_eq!(second.receipt_no, first.receipt_no + 1);
}
