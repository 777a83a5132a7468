//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the policy lifecycle engine, built on SQLx.
//!
//! # Architecture
//!
//! - [`pool`]: connection pool configuration and embedded migrations
//! - [`repositories`]: SQL and row mapping, one repository per aggregate
//! - [`adapters`]: implementations of the domain ports on top of the
//!   repositories
//!
//! Policy rows carry a version column. Every write that changes a policy
//! checks the version the caller loaded and runs in the same database
//! transaction as the row that triggered it.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresLifecycleStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/lifecycle")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresLifecycleStore::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{
    PostgresCatalogAdapter, PostgresDocumentAdapter, PostgresLifecycleStore,
    PostgresPartyAdapter, PostgresPaymentGateway, PostgresSettingsAdapter,
};
pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
