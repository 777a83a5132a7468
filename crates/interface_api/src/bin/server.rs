//! Policy Lifecycle API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin lifecycle-api
//!
//! # Run with environment variables
//! API_PORT=8080 API_DATABASE_URL=postgres://... cargo run --bin lifecycle-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_LOG_FORMAT` - `plain` or `json` (default: plain)
//! * `API_BUSINESS_TIMEZONE` - IANA zone for "today" (default: Asia/Kolkata)
//! * `API_GATEWAY_WEBHOOK_SECRET` - Shared secret for gateway capture callbacks

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::SystemClock;
use domain_lifecycle::{EngineConfig, LifecycleEngine, LifecyclePorts, LoggingNotifier};
use infra_db::{
    create_pool, run_migrations, DatabaseConfig, DatabasePool, PostgresCatalogAdapter,
    PostgresDocumentAdapter, PostgresLifecycleStore, PostgresPartyAdapter, PostgresPaymentGateway,
    PostgresSettingsAdapter,
};
use interface_api::config::{ApiConfig, LogFormat};
use interface_api::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("loading API configuration")?;

    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        timezone = config.business_timezone.0.name(),
        "Starting policy lifecycle API server"
    );

    for name in config.placeholder_secrets() {
        tracing::warn!(
            variable = name,
            "Secret is still the built-in placeholder; set it before exposing the server"
        );
    }

    let pool = create_pool(
        DatabaseConfig::new(config.database_url.clone())
            .max_connections(config.db_max_connections),
    )
    .await
    .context("connecting to the database")?;

    run_migrations(&pool).await.context("applying migrations")?;

    let engine = LifecycleEngine::new(
        postgres_ports(&pool),
        Arc::new(SystemClock::new(config.business_timezone)),
        EngineConfig::default(),
    );

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .context("parsing the server address")?;
    let app = create_router(AppState { engine, config });

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn postgres_ports(pool: &DatabasePool) -> LifecyclePorts {
    LifecyclePorts {
        parties: Arc::new(PostgresPartyAdapter::new(pool.clone())),
        catalog: Arc::new(PostgresCatalogAdapter::new(pool.clone())),
        settings: Arc::new(PostgresSettingsAdapter::new(pool.clone())),
        documents: Arc::new(PostgresDocumentAdapter::new(pool.clone())),
        gateway: Arc::new(PostgresPaymentGateway::new(pool.clone())),
        store: Arc::new(PostgresLifecycleStore::new(pool.clone())),
        notifier: Arc::new(LoggingNotifier),
    }
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Plain => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

/// Waits for Ctrl+C or SIGTERM so in-flight requests can finish
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
