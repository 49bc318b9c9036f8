//! Webhook signature verification and event parsing
//!
//! The gateway signs each callback with HMAC-SHA256 over the raw request
//! body using a shared secret, hex-encoded in the `x-signature` header.
//! Verification uses a constant-time comparison.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Event type reported when a payment capture succeeds
pub const EVENT_PAYMENT_CAPTURED: &str = "payment.captured";

/// A parsed gateway webhook event
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// Event type, e.g. `payment.captured`
    pub event: String,
    /// Event payload
    pub payload: WebhookPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    /// Gateway order handle the event refers to
    pub order_id: String,
    /// Gateway payment/capture id, when the event carries one
    #[serde(default)]
    pub payment_id: Option<String>,
}

impl WebhookEvent {
    /// Parse a raw webhook body
    pub fn parse(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    /// Whether this event reports a successful capture
    pub fn is_capture(&self) -> bool {
        self.event == EVENT_PAYMENT_CAPTURED
    }
}

/// Verifies webhook signatures against the shared secret
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Compute the expected hex signature for a raw payload
    pub fn sign(&self, raw_body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(raw_body);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verify a signature header against the raw payload, constant-time.
    pub fn verify(&self, raw_body: &[u8], signature: &str) -> bool {
        let expected = self.sign(raw_body);
        expected.as_bytes().ct_eq(signature.as_bytes()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_signature() {
        let verifier = WebhookVerifier::new("whsec_test");
        let body = br#"{"event":"payment.captured","payload":{"order_id":"order_1"}}"#;
        let signature = verifier.sign(body);
        assert!(verifier.verify(body, &signature));
    }

    #[test]
    fn test_tampered_body_rejected() {
        let verifier = WebhookVerifier::new("whsec_test");
        let signature = verifier.sign(b"original");
        assert!(!verifier.verify(b"tampered", &signature));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let body = b"payload";
        let signature = WebhookVerifier::new("whsec_other").sign(body);
        assert!(!WebhookVerifier::new("whsec_test").verify(body, &signature));
    }

    #[test]
    fn test_parse_capture_event() {
        let body = br#"{"event":"payment.captured","payload":{"order_id":"order_1","payment_id":"pay_9"}}"#;
        let event = WebhookEvent::parse(body).unwrap();
        assert!(event.is_capture());
        assert_eq!(event.payload.order_id, "order_1");
        assert_eq!(event.payload.payment_id.as_deref(), Some("pay_9"));
    }

    #[test]
    fn test_non_capture_event() {
        let body = br#"{"event":"payment.failed","payload":{"order_id":"order_1"}}"#;
        let event = WebhookEvent::parse(body).unwrap();
        assert!(!event.is_capture());
    }
}
