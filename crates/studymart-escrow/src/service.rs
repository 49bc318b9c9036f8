//! Escrow orchestrator
//!
//! Drives the order lifecycle: purchase initiation with a gateway hold,
//! capture confirmation from signed webhooks, OTP-gated delivery
//! confirmation, and refunds. Every transition goes through a store CAS;
//! gateway side effects fire only after the CAS is won, so two racing
//! callers never double-capture or double-refund. Terminal orders stay
//! unsettled until the gateway accepts the capture or refund; the sweep
//! retries unsettled orders every pass, so a transient gateway failure
//! never strands the money.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use subtle::ConstantTimeEq;
use tracing::{error, info, warn};

use studymart_gateway::{PaymentGateway, WebhookEvent, WebhookVerifier};
use studymart_notify::{generate_otp, NotificationSender, OtpNotice};
use studymart_types::{
    money::{to_minor_units, CURRENCY},
    EscrowOrder, MaterialId, OrderId, OrderState, StudentId,
};

use crate::error::{EscrowError, EscrowResult};
use crate::store::{CatalogStore, NewOrder, OrderStore};

/// Lifecycle windows and currency for the orchestrator
#[derive(Debug, Clone)]
pub struct EscrowConfig {
    /// How long a `created` order waits for payment
    pub payment_window: Duration,
    /// How long a `paid` order waits for delivery
    pub delivery_window: Duration,
    /// How long a delivery OTP stays valid
    pub otp_window: Duration,
    /// Grace before a `pending_hold` row is considered abandoned
    pub pending_hold_grace: Duration,
    /// ISO currency code for gateway holds
    pub currency: String,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            payment_window: Duration::days(3),
            delivery_window: Duration::days(3),
            otp_window: Duration::hours(24),
            pending_hold_grace: Duration::minutes(15),
            currency: CURRENCY.to_string(),
        }
    }
}

/// Disposition of a capture webhook
#[derive(Debug)]
pub enum CaptureOutcome {
    /// Capture recorded; the order moved to `paid`
    Applied(EscrowOrder),
    /// Duplicate delivery of an event we already applied
    AlreadyProcessed,
    /// Authenticated event for an order we do not track; acknowledged so the
    /// gateway stops retrying
    Ignored,
}

/// What one sweep pass did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Orders cancelled before payment
    pub cancelled: usize,
    /// Orders refunded after payment, with the gateway refund confirmed
    pub refunded: usize,
    /// Previously failed gateway settlements that went through this pass
    pub settled: usize,
    /// Orders whose sweep action failed and will be retried next pass
    pub failed: usize,
}

/// The escrow orchestrator
pub struct EscrowService {
    orders: Arc<dyn OrderStore>,
    catalog: Arc<dyn CatalogStore>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn NotificationSender>,
    verifier: WebhookVerifier,
    config: EscrowConfig,
}

impl EscrowService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn NotificationSender>,
        verifier: WebhookVerifier,
        config: EscrowConfig,
    ) -> Self {
        Self {
            orders,
            catalog,
            gateway,
            notifier,
            verifier,
            config,
        }
    }

    /// Start a purchase: validate the request, persist a provisional order,
    /// then create the gateway hold and finalize the row to `created`.
    ///
    /// The provisional row goes in before the gateway call, so a crash
    /// between the two leaves a `pending_hold` row the sweep cleans up
    /// instead of an untracked hold. Validation reports every violation at
    /// once rather than the first.
    pub async fn initiate_purchase(
        &self,
        material_id: MaterialId,
        buyer_id: StudentId,
        seller_id: StudentId,
    ) -> EscrowResult<EscrowOrder> {
        let material = self.catalog.material(material_id).await?;
        let buyer = self.catalog.student(buyer_id).await?;

        let mut violations = Vec::new();
        if buyer.is_none() {
            violations.push(format!("buyer {buyer_id} does not exist"));
        }
        let material = match material {
            None => {
                violations.push(format!("material {material_id} does not exist"));
                return Err(EscrowError::Validation(violations));
            }
            Some(m) => m,
        };
        if material.seller_id != seller_id {
            violations.push(format!(
                "seller {seller_id} does not own material {material_id}"
            ));
        }
        if !material.active {
            violations.push(format!("material {material_id} is no longer listed"));
        }
        if material.price <= rust_decimal::Decimal::ZERO {
            violations.push(format!("material {material_id} has a non-positive price"));
        }
        if material.seller_id == buyer_id {
            violations.push("buyer and seller are the same student".to_string());
        }
        if !violations.is_empty() {
            return Err(EscrowError::Validation(violations));
        }

        let order = self
            .orders
            .insert_pending(NewOrder {
                id: OrderId::new(),
                material_id,
                seller_id: material.seller_id,
                buyer_id,
                amount: material.price,
            })
            .await?;

        let amount_minor = to_minor_units(order.amount)?;
        let hold = match self
            .gateway
            .create_hold(amount_minor, &self.config.currency, &order.id.to_string())
            .await
        {
            Ok(hold) => hold,
            Err(e) => {
                // No hold exists; retire the provisional row. If this loses
                // too, the sweep gets it.
                if self.orders.cancel(order.id).await.is_err() {
                    warn!(order_id = %order.id, "Failed to cancel provisional order after hold failure");
                }
                return Err(e.into());
            }
        };

        let payment_deadline = Utc::now() + self.config.payment_window;
        let finalized = self
            .orders
            .finalize_hold(order.id, &hold.order_id, payment_deadline)
            .await?;

        match finalized {
            Some(order) => {
                info!(
                    order_id = %order.id,
                    receipt_no = order.receipt_no,
                    gateway_order_id = %hold.order_id,
                    "Purchase initiated"
                );
                Ok(order)
            }
            // The sweep cancelled the row while the gateway call was in
            // flight. The hold is unpaid and lapses at the gateway.
            None => Err(EscrowError::StateConflict {
                operation: "initiate purchase",
                current: OrderState::Cancelled,
            }),
        }
    }

    /// Apply a gateway webhook: verify the signature over the raw body,
    /// parse the event, and on `payment.captured` move the order to `paid`.
    ///
    /// Idempotent: duplicate deliveries and events for unknown orders are
    /// acknowledged without effect, so the gateway never retries forever.
    pub async fn confirm_capture(
        &self,
        raw_body: &[u8],
        signature: &str,
    ) -> EscrowResult<CaptureOutcome> {
        if !self.verifier.verify(raw_body, signature) {
            return Err(EscrowError::InvalidSignature);
        }

        let event =
            WebhookEvent::parse(raw_body).map_err(|e| EscrowError::MalformedEvent(e.to_string()))?;
        if !event.is_capture() {
            info!(event = %event.event, "Ignoring non-capture webhook event");
            return Ok(CaptureOutcome::Ignored);
        }
        let capture_id = event
            .payload
            .payment_id
            .as_deref()
            .ok_or_else(|| EscrowError::MalformedEvent("capture event without payment_id".into()))?;

        let order = match self
            .orders
            .find_by_gateway_order(&event.payload.order_id)
            .await?
        {
            Some(order) => order,
            None => {
                warn!(
                    gateway_order_id = %event.payload.order_id,
                    "Capture webhook for unknown order"
                );
                return Ok(CaptureOutcome::Ignored);
            }
        };

        let delivery_deadline = Utc::now() + self.config.delivery_window;
        match self
            .orders
            .mark_paid(order.id, capture_id, delivery_deadline)
            .await?
        {
            Some(order) => {
                info!(order_id = %order.id, capture_id, "Payment captured");
                Ok(CaptureOutcome::Applied(order))
            }
            None => Ok(CaptureOutcome::AlreadyProcessed),
        }
    }

    /// Seller reports delivery: issue a fresh OTP and notify the buyer.
    ///
    /// Re-marking a `delivered` order supersedes the previous unconsumed
    /// code. A notification failure does not roll the order back; the
    /// seller can re-mark to trigger a new code.
    pub async fn mark_delivered(&self, order_id: OrderId) -> EscrowResult<EscrowOrder> {
        let order = self
            .orders
            .find(order_id)
            .await?
            .ok_or_else(|| EscrowError::NotFound(format!("Order {order_id}")))?;

        let otp_code = generate_otp();
        let otp_expires_at = Utc::now() + self.config.otp_window;
        let updated = self
            .orders
            .mark_delivered(order_id, &otp_code, otp_expires_at)
            .await?
            .ok_or(EscrowError::StateConflict {
                operation: "mark delivery",
                current: order.state,
            })?;

        match self.catalog.student(updated.buyer_id).await? {
            Some(buyer) => {
                let notice = OtpNotice {
                    recipient: buyer.email,
                    otp_code,
                    order_reference: format!("SM-{}", updated.receipt_no),
                };
                if let Err(e) = self.notifier.send_otp(notice).await {
                    warn!(order_id = %order_id, error = %e, "OTP notification failed");
                }
            }
            None => {
                warn!(order_id = %order_id, buyer_id = %updated.buyer_id, "Buyer contact missing, OTP not sent");
            }
        }

        info!(order_id = %order_id, "Delivery marked, OTP issued");
        Ok(updated)
    }

    /// Buyer confirms delivery with the OTP, releasing the held funds to
    /// the seller.
    ///
    /// A correct code presented after the window closed refunds the buyer
    /// instead; the code stays valid through the expiry instant itself. The
    /// comparison is constant-time.
    pub async fn confirm_delivery(&self, order_id: OrderId, otp: &str) -> EscrowResult<EscrowOrder> {
        let order = self
            .orders
            .find(order_id)
            .await?
            .ok_or_else(|| EscrowError::NotFound(format!("Order {order_id}")))?;

        if order.state != OrderState::Delivered {
            return Err(EscrowError::StateConflict {
                operation: "confirm delivery",
                current: order.state,
            });
        }
        let expected = order.otp_code.as_deref().ok_or(EscrowError::InvalidOtp)?;
        if !bool::from(expected.as_bytes().ct_eq(otp.as_bytes())) {
            return Err(EscrowError::InvalidOtp);
        }

        if order.otp_expired(Utc::now()) {
            self.refund_order(&order, "OTP expired").await?;
            return Err(EscrowError::OtpExpired);
        }

        let completed = match self.orders.complete(order_id).await? {
            Some(order) => order,
            None => {
                // Lost the race; report where the order actually ended up.
                let current = self
                    .orders
                    .find(order_id)
                    .await?
                    .map(|o| o.state)
                    .unwrap_or(order.state);
                return Err(EscrowError::StateConflict {
                    operation: "confirm delivery",
                    current,
                });
            }
        };

        // A failed capture leaves the order unsettled; the sweep retries it.
        let completed = self.settle(&completed).await?.unwrap_or(completed);

        info!(order_id = %order_id, receipt_no = completed.receipt_no, "Delivery confirmed, escrow released");
        Ok(completed)
    }

    /// Look up a single order
    pub async fn order(&self, order_id: OrderId) -> EscrowResult<EscrowOrder> {
        self.orders
            .find(order_id)
            .await?
            .ok_or_else(|| EscrowError::NotFound(format!("Order {order_id}")))
    }

    /// One sweep pass over expired and unsettled orders.
    ///
    /// Abandoned `pending_hold` and unpaid `created` orders are cancelled;
    /// `paid` orders past their delivery deadline and `delivered` orders
    /// past their OTP window are refunded. Terminal orders whose gateway
    /// capture or refund failed on an earlier pass are retried first.
    /// Failures are isolated per order and retried on the next pass.
    pub async fn sweep(&self, now: DateTime<Utc>) -> EscrowResult<SweepReport> {
        let mut report = SweepReport::default();

        for order in self.orders.unsettled().await? {
            match self.settle(&order).await {
                Ok(Some(_)) => report.settled += 1,
                Ok(None) => report.failed += 1,
                Err(e) => {
                    error!(order_id = %order.id, state = %order.state, error = %e, "Settlement retry failed");
                    report.failed += 1;
                }
            }
        }

        let cutoff = now - self.config.pending_hold_grace;
        for order in self.orders.sweepable(now, cutoff).await? {
            match order.state {
                OrderState::PendingHold | OrderState::Created => {
                    match self.cancel_order(&order).await {
                        Ok(true) => report.cancelled += 1,
                        Ok(false) => {} // lost the CAS to a concurrent actor
                        Err(e) => {
                            error!(order_id = %order.id, state = %order.state, error = %e, "Sweep cancel failed");
                            report.failed += 1;
                        }
                    }
                }
                OrderState::Paid | OrderState::Delivered => {
                    match self.refund_order(&order, "deadline passed").await {
                        Ok(Some(o)) if o.settled => report.refunded += 1,
                        Ok(Some(_)) => report.failed += 1,
                        Ok(None) => {}
                        Err(e) => {
                            error!(order_id = %order.id, state = %order.state, error = %e, "Sweep refund failed");
                            report.failed += 1;
                        }
                    }
                }
                _ => {}
            }
        }

        if report != SweepReport::default() {
            info!(
                cancelled = report.cancelled,
                refunded = report.refunded,
                settled = report.settled,
                failed = report.failed,
                "Sweep pass finished"
            );
        }
        Ok(report)
    }

    /// Cancel an unpaid order. The gateway hold, if any, lapses unpaid on
    /// its own, so no gateway call is needed.
    async fn cancel_order(&self, order: &EscrowOrder) -> EscrowResult<bool> {
        match self.orders.cancel(order.id).await? {
            Some(_) => {
                info!(order_id = %order.id, from = %order.state, "Order cancelled");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Refund a captured order: win the CAS first, then move the money.
    ///
    /// Returns `None` when another actor already moved the order. The
    /// returned row's `settled` flag says whether the gateway refund went
    /// through; an unsettled row is retried by the sweep.
    async fn refund_order(
        &self,
        order: &EscrowOrder,
        reason: &str,
    ) -> EscrowResult<Option<EscrowOrder>> {
        let refunded = match self.orders.refund(order.id).await? {
            Some(o) => o,
            None => return Ok(None),
        };
        info!(order_id = %order.id, reason, "Order refunded");

        let settled = self.settle(&refunded).await?;
        Ok(Some(settled.unwrap_or(refunded)))
    }

    /// Push the gateway money movement for a terminal order and mark the
    /// row settled.
    ///
    /// Returns `None` when the gateway call failed; the order stays
    /// unsettled and the next sweep pass retries it.
    async fn settle(&self, order: &EscrowOrder) -> EscrowResult<Option<EscrowOrder>> {
        let capture_id = match order.capture_id.as_deref() {
            Some(id) => id,
            // Never captured; there is no money to move.
            None => return Ok(self.orders.mark_settled(order.id).await?),
        };

        let moved = match order.state {
            OrderState::Completed => {
                let amount_minor = to_minor_units(order.amount)?;
                self.gateway.capture(capture_id, amount_minor).await
            }
            OrderState::Refunded => self.gateway.refund(capture_id).await,
            _ => return Ok(Some(order.clone())),
        };

        match moved {
            Ok(()) => Ok(self.orders.mark_settled(order.id).await?),
            Err(e) => {
                error!(
                    order_id = %order.id,
                    state = %order.state,
                    error = %e,
                    "Gateway settlement failed, retrying next sweep"
                );
                Ok(None)
            }
        }
    }
}
