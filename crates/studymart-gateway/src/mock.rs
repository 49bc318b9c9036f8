//! Recording mock gateway for tests and local development

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{GatewayError, GatewayHold, GatewayResult, PaymentGateway};

/// A gateway call observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    CreateHold {
        amount_minor: i64,
        currency: String,
        reference: String,
    },
    Capture {
        capture_id: String,
        amount_minor: i64,
    },
    Refund {
        capture_id: String,
    },
}

/// In-memory gateway that records calls and can be told to fail
#[derive(Default)]
pub struct MockGateway {
    calls: Mutex<Vec<GatewayCall>>,
    next_order: AtomicU64,
    fail_holds: AtomicBool,
    fail_captures: AtomicBool,
    fail_refunds: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `create_hold` calls fail
    pub fn fail_holds(&self, fail: bool) {
        self.fail_holds.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `capture` calls fail
    pub fn fail_captures(&self, fail: bool) {
        self.fail_captures.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `refund` calls fail
    pub fn fail_refunds(&self, fail: bool) {
        self.fail_refunds.store(fail, Ordering::SeqCst);
    }

    /// Calls observed so far
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_hold(
        &self,
        amount_minor: i64,
        currency: &str,
        reference: &str,
    ) -> GatewayResult<GatewayHold> {
        if self.fail_holds.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                status: 503,
                body: "gateway unavailable".to_string(),
            });
        }
        self.record(GatewayCall::CreateHold {
            amount_minor,
            currency: currency.to_string(),
            reference: reference.to_string(),
        });
        let n = self.next_order.fetch_add(1, Ordering::SeqCst);
        Ok(GatewayHold {
            order_id: format!("order_mock_{}", n),
            amount_minor,
            currency: currency.to_string(),
        })
    }

    async fn capture(&self, capture_id: &str, amount_minor: i64) -> GatewayResult<()> {
        if self.fail_captures.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                status: 500,
                body: "capture failed".to_string(),
            });
        }
        self.record(GatewayCall::Capture {
            capture_id: capture_id.to_string(),
            amount_minor,
        });
        Ok(())
    }

    async fn refund(&self, capture_id: &str) -> GatewayResult<()> {
        if self.fail_refunds.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                status: 500,
                body: "refund failed".to_string(),
            });
        }
        self.record(GatewayCall::Refund {
            capture_id: capture_id.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls_in_order() {
        let gateway = MockGateway::new();
        let hold = gateway.create_hold(50_000, "INR", "ref-1").await.unwrap();
        gateway.capture(&hold.order_id, 50_000).await.unwrap();

        let calls = gateway.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], GatewayCall::CreateHold { amount_minor: 50_000, .. }));
    }

    #[tokio::test]
    async fn test_fail_holds() {
        let gateway = MockGateway::new();
        gateway.fail_holds(true);
        assert!(gateway.create_hold(100, "INR", "ref").await.is_err());
        assert!(gateway.calls().is_empty());
    }
}
