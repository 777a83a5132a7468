//! Test Utilities Crate
//!
//! Shared test infrastructure for the policy lifecycle test suite.
//!
//! # Modules
//!
//! - `fixtures`: Deterministic dates, ids and amounts
//! - `builders`: Builders for parties, plans and policies with sensible defaults
//! - `database`: PostgreSQL test containers with the schema applied
//! - `assertions`: Assertion helpers for money and lifecycle state
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
