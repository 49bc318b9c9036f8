//! StudyMart Types - Canonical domain types for the escrow marketplace
//!
//! This crate contains the foundational types for StudyMart with zero
//! dependencies on other studymart crates:
//!
//! - Identity types (OrderId, MaterialId, StudentId)
//! - The escrow order and its state machine
//! - Money helpers (major units as `Decimal`, minor units for the gateway)
//!
//! # Architectural Invariants
//!
//! 1. Order state transitions are monotonic — an order never moves backward
//! 2. `amount` is fixed at order creation and never recomputed
//! 3. Terminal orders (`completed`, `refunded`, `cancelled`) are retained
//!    for audit, never deleted

pub mod identity;
pub mod money;
pub mod order;
pub mod error;

pub use identity::*;
pub use money::*;
pub use order::*;
pub use error::*;

/// Version of the StudyMart types schema
pub const TYPES_VERSION: &str = "0.1.0";
