//! StudyMart Escrow - Order lifecycle orchestration
//!
//! The heart of the marketplace backend. Purchases run through a gateway
//! payment hold, a webhook-confirmed capture, seller delivery, and an
//! OTP-gated buyer confirmation that releases the funds. An hourly sweep
//! cancels or refunds orders whose deadline passed.
//!
//! The orchestrator is generic over its collaborators: storage behind
//! [`store::OrderStore`]/[`store::CatalogStore`], the payment provider
//! behind `PaymentGateway`, and OTP delivery behind `NotificationSender`.
//! Tests run the full lifecycle against the in-memory implementations.

pub mod error;
pub mod service;
pub mod store;
pub mod sweep;

pub use error::{EscrowError, EscrowResult};
pub use service::{CaptureOutcome, EscrowConfig, EscrowService, SweepReport};
pub use sweep::{run_sweeper, SWEEP_INTERVAL};
