//! Application state shared across handlers

use std::sync::Arc;

use studymart_db::Database;
use studymart_escrow::EscrowService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connections, for catalog and student endpoints
    pub db: Arc<Database>,
    /// Escrow orchestrator, for everything under `/payment`
    pub escrow: Arc<EscrowService>,
}

impl AppState {
    pub fn new(db: Arc<Database>, escrow: Arc<EscrowService>) -> Self {
        Self { db, escrow }
    }
}
