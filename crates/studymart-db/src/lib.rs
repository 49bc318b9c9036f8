//! StudyMart Database Layer
//!
//! PostgreSQL persistence for the StudyMart escrow marketplace.
//!
//! # Repository Pattern
//!
//! Each domain has its own repository with CRUD and domain-specific
//! queries. Escrow order transitions are conditional updates on the
//! current state so that concurrent writers (a request handler and the
//! sweep) can never both win the same transition.

pub mod config;
pub mod error;
pub mod models;
pub mod repos;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

pub use config::DatabaseConfig;
pub use error::{DbError, DbResult};
pub use models::*;
pub use repos::*;

/// Database connection pool
pub struct Database {
    /// PostgreSQL connection pool
    pub pg: PgPool,
}

impl Database {
    /// Connect to PostgreSQL
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("Connecting to PostgreSQL: {}", config.postgres_url_masked());

        let pg = PgPoolOptions::new()
            .max_connections(config.pg_max_connections)
            .min_connections(config.pg_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.pg_acquire_timeout_secs))
            .connect(&config.postgres_url)
            .await
            .map_err(|e| DbError::Connection(format!("PostgreSQL: {}", e)))?;

        info!("Connected to PostgreSQL");

        Ok(Self { pg })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> DbResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pg)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        info!("Migrations complete");
        Ok(())
    }

    /// Health check
    pub async fn health_check(&self) -> DbResult<bool> {
        let ok = sqlx::query("SELECT 1").fetch_one(&self.pg).await.is_ok();
        Ok(ok)
    }

    /// Create repository instances
    pub fn student_repo(&self) -> StudentRepo {
        StudentRepo::new(self.pg.clone())
    }

    pub fn material_repo(&self) -> MaterialRepo {
        MaterialRepo::new(self.pg.clone())
    }

    pub fn escrow_order_repo(&self) -> EscrowOrderRepo {
        EscrowOrderRepo::new(self.pg.clone())
    }
}
