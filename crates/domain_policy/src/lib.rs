//! Policy Domain
//!
//! Catalog reference data, installment scheduling, eligibility, the Policy
//! aggregate and the agent commission read model.
//!
//! # Policy Lifecycle
//!
//! ```text
//! ACTIVE -> EXPIRED    (payment taken after the end date)
//!        -> CLAIMED    (claim approved)
//!        -> CANCELLED  (withdrawal approved)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_policy::{check_eligibility, EligibilityRequest, PolicyBuilder};
//!
//! check_eligibility(&customer, &plan, EligibilityRequest { term_years: 10, total_investment: 100_000 }, today)?;
//!
//! let policy = PolicyBuilder::new()
//!     .plan(plan.id)
//!     .customer(customer.id)
//!     .start_date(today)
//!     .term_years(10)
//!     .total_investment(100_000)
//!     .payment_interval(PaymentInterval::Quarterly)
//!     .build()?;
//! ```

pub mod aggregate;
pub mod catalog;
pub mod commission;
pub mod eligibility;
pub mod events;
pub mod error;
pub mod ports;
pub mod schedule;

pub use aggregate::{InstallmentOutcome, Policy, PolicyBuilder, PolicyRecord, PolicyStatus};
pub use catalog::{InsurancePlan, InsuranceScheme, PlanWithScheme};
pub use commission::{commission_lines, summarize, CommissionLine, CommissionSummary};
pub use eligibility::{check_eligibility, EligibilityRequest};
pub use events::PolicyEvent;
pub use error::PolicyError;
pub use ports::CatalogPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockCatalogPort;
pub use schedule::{schedule_installments, InstallmentSchedule, PaymentInterval};
