//! StudyMart server
//!
//! Wires the escrow orchestrator to PostgreSQL storage, the payment
//! gateway client, and the REST API, and runs the hourly expiry sweep.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings
//! studymart-server
//!
//! # Start with custom config
//! studymart-server --config /path/to/config.toml
//!
//! # Start with environment overrides
//! STUDYMART__SERVER__PORT=8080 studymart-server
//! ```

mod config;

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use studymart_api::{create_router, ApiConfig, AppState};
use studymart_db::{Database, DatabaseConfig};
use studymart_escrow::store::{PgCatalog, PgOrderStore};
use studymart_escrow::{run_sweeper, EscrowConfig, EscrowService};
use studymart_gateway::http::{GatewayConfig, HttpGateway};
use studymart_gateway::WebhookVerifier;
use studymart_notify::LogSender;

use crate::config::ServerConfig;

/// StudyMart escrow marketplace server
#[derive(Parser, Debug)]
#[command(name = "studymart-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "STUDYMART_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "STUDYMART_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "STUDYMART_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "STUDYMART_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, env = "STUDYMART_LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Gateway webhook shared secret
    #[arg(long, env = "GATEWAY_WEBHOOK_SECRET")]
    webhook_secret: Option<String>,

    /// Allow placeholder secrets (development only)
    #[arg(long, env = "STUDYMART_DEV_MODE")]
    dev_mode: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;

    if let Some(host) = args.host {
        server_config.server.host = host;
    }
    if let Some(port) = args.port {
        server_config.server.port = port;
    }
    if let Some(db_url) = args.database_url {
        server_config.database.postgres_url = db_url;
    }
    if let Some(secret) = args.webhook_secret {
        server_config.gateway.webhook_secret = secret;
    }
    server_config.logging.level = args.log_level;
    server_config.logging.format = args.log_format;

    init_logging(&server_config.logging);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting StudyMart server"
    );

    validate_config(&server_config, args.dev_mode)?;

    // Database
    let db = init_database(&server_config).await?;

    // Escrow orchestrator over PostgreSQL stores and the HTTP gateway
    let gateway = Arc::new(HttpGateway::new(GatewayConfig {
        base_url: server_config.gateway.base_url.clone(),
        key_id: server_config.gateway.key_id.clone(),
        key_secret: server_config.gateway.key_secret.clone(),
    }));
    let escrow = Arc::new(EscrowService::new(
        Arc::new(PgOrderStore::new(&db)),
        Arc::new(PgCatalog::new(db.clone())),
        gateway,
        Arc::new(LogSender),
        WebhookVerifier::new(server_config.gateway.webhook_secret.clone()),
        EscrowConfig {
            payment_window: ChronoDuration::hours(server_config.escrow.payment_window_hours),
            delivery_window: ChronoDuration::hours(server_config.escrow.delivery_window_hours),
            otp_window: ChronoDuration::hours(server_config.escrow.otp_window_hours),
            pending_hold_grace: ChronoDuration::minutes(
                server_config.escrow.pending_hold_grace_mins,
            ),
            ..EscrowConfig::default()
        },
    ));

    // Expiry sweep on its own task
    let sweep_interval = Duration::from_secs(server_config.escrow.sweep_interval_secs);
    tokio::spawn(run_sweeper(escrow.clone(), sweep_interval));

    // HTTP surface
    let state = Arc::new(AppState::new(db, escrow));
    let api_config = ApiConfig {
        enable_cors: server_config.api.enable_cors,
        cors_origins: server_config.api.cors_origins.clone(),
        enable_compression: server_config.api.enable_compression,
        enable_tracing: server_config.api.enable_tracing,
    };
    let app = create_router(state, api_config);

    let addr = server_config.server.socket_addr()?;
    tracing::info!(
        host = %server_config.server.host,
        port = server_config.server.port,
        "Server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(server_config.server.shutdown_timeout()))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber.with(fmt::layer().json().with_target(true)).init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .init();
        }
    }
}

/// Refuse placeholder secrets outside development
fn validate_config(config: &ServerConfig, dev_mode: bool) -> anyhow::Result<()> {
    if !dev_mode && config.gateway.webhook_secret == "change-me-in-production" {
        anyhow::bail!(
            "Webhook secret must be changed in production. Set GATEWAY_WEBHOOK_SECRET."
        );
    }
    if !dev_mode && config.gateway.key_secret.is_empty() {
        anyhow::bail!("Gateway API credentials are not configured");
    }
    Ok(())
}

/// Connect, migrate, and verify the database
async fn init_database(config: &ServerConfig) -> anyhow::Result<Arc<Database>> {
    let db_config = DatabaseConfig {
        postgres_url: config.database.postgres_url.clone(),
        pg_max_connections: config.database.max_connections,
        pg_min_connections: config.database.min_connections,
        pg_acquire_timeout_secs: config.database.connect_timeout_secs,
    };

    let db = Database::connect(&db_config).await?;

    if config.database.run_migrations {
        db.migrate().await?;
    }

    if !db.health_check().await? {
        anyhow::bail!("Database health check failed");
    }

    Ok(Arc::new(db))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    tracing::info!(
        timeout_secs = timeout.as_secs(),
        "Waiting for in-flight requests to complete..."
    );
    tokio::time::sleep(timeout).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["studymart-server", "--port", "8080"]);
        assert_eq!(args.port, Some(8080));
    }

    #[test]
    fn test_placeholder_secret_rejected_outside_dev_mode() {
        let config = ServerConfig::default();
        assert!(validate_config(&config, false).is_err());
        assert!(validate_config(&config, true).is_ok());
    }
}
