//! Domain Adapters
//!
//! PostgreSQL implementations of the domain ports. Each adapter translates
//! between domain models and repository rows; database errors become
//! `PortError`s through `From<DatabaseError>`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresLifecycleStore;
//! use domain_lifecycle::LifecycleStore;
//!
//! let store: Arc<dyn LifecycleStore> = Arc::new(PostgresLifecycleStore::new(pool));
//! let policy = store.get_policy(policy_id).await?;
//! ```

pub mod catalog;
pub mod documents;
pub mod gateway;
pub mod party;
pub mod settings;
pub mod store;

pub use catalog::PostgresCatalogAdapter;
pub use documents::PostgresDocumentAdapter;
pub use gateway::PostgresPaymentGateway;
pub use party::PostgresPartyAdapter;
pub use settings::PostgresSettingsAdapter;
pub use store::PostgresLifecycleStore;

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, HealthCheckResult};

/// Round-trips a trivial query to report pool health
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        },
        Err(e) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(format!("Database error: {}", e)),
            checked_at: Utc::now(),
        },
    }
}
