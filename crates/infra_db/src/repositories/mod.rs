//! Repository implementations for domain entities
//!
//! Repositories own the SQL and map between database rows and domain types.
//! Reads run on the pool. Writes that must commit together with a policy
//! update take a `&mut PgConnection` so the adapter can run them inside one
//! database transaction.

pub mod billing;
pub mod catalog;
pub mod claims;
pub mod party;
pub mod policy;
pub mod withdrawal;

pub use billing::BillingRepository;
pub use catalog::CatalogRepository;
pub use claims::ClaimsRepository;
pub use party::PartyRepository;
pub use policy::PolicyRepository;
pub use withdrawal::WithdrawalRepository;
