//! Policy Financial Lifecycle Engine
//!
//! Owns a policy's monetary state over time: issuance with installment
//! scheduling, amount-due quotes, payment application, and the three
//! terminal transitions (expiry at term completion, claim approval,
//! withdrawal approval) together with the payouts and commissions they
//! imply.
//!
//! The engine talks to the outside world only through ports:
//!
//! - [`LifecycleStore`] persists policies, transactions, claims and
//!   withdrawal requests in atomic units of work
//! - [`NotificationPort`] tells customers what happened
//! - the party, catalog, settings, document and gateway ports of the
//!   domain crates

pub mod config;
pub mod engine;
pub mod error;
pub mod notification;
pub mod store;
pub mod views;

#[cfg(any(test, feature = "mock"))]
pub mod harness;

pub use config::EngineConfig;
pub use engine::{ClaimSubmission, LifecycleEngine, LifecyclePorts, PolicyApplication};
pub use error::LifecycleError;
pub use notification::{LoggingNotifier, Notification, NotificationPort, Recipient};
#[cfg(any(test, feature = "mock"))]
pub use notification::mock::MockNotifier;
pub use store::{LifecycleStore, PolicyUpdate};
#[cfg(any(test, feature = "mock"))]
pub use store::mock::MockLifecycleStore;
pub use views::{ClaimResolution, CurrentSettings, PaymentReceipt, PolicyView, WithdrawalResolution};
