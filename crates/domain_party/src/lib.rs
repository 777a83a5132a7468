//! Party Domain
//!
//! The people who act on a policy: customers who own and pay for it, agents
//! who sell it, admins who resolve claims and withdrawals, and employees who
//! assist with back-office reads. Requests are attributed to an [`Actor`]
//! rather than to a role string.
//!
//! # Examples
//!
//! ```rust
//! use domain_party::{Customer, VerificationStatus};
//! use chrono::NaiveDate;
//!
//! let customer = Customer::new(
//!     "Asha",
//!     "Rao",
//!     "asha@example.com",
//!     NaiveDate::from_ymd_opt(1990, 7, 1).unwrap(),
//! )
//! .with_verification(VerificationStatus::Approved);
//!
//! assert!(customer.is_verified());
//! assert_eq!(customer.age_on(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()), 35);
//! ```

pub mod party;
pub mod kyc;
pub mod agent;
pub mod error;
pub mod validation;
pub mod ports;

pub use party::{Actor, Admin, Customer, Employee, Role};
pub use kyc::VerificationStatus;
pub use agent::Agent;
pub use error::PartyError;
pub use validation::{validate_agent, validate_customer};
pub use ports::PartyPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockPartyPort;
