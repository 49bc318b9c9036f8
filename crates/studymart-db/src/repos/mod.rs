//! Repository modules
//!
//! One repository per domain. All queries go through the shared PgPool.

mod material;
mod order;
mod student;

pub use material::{MaterialFilter, MaterialRepo, NewMaterial};
pub use order::{EscrowOrderRepo, NewEscrowOrder};
pub use student::{NewStudent, StudentRepo};
