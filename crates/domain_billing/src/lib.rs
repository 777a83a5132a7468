//! Billing Domain
//!
//! Everything that turns an installment into money moving:
//!
//! - **Settings**: append-only tax and insurance snapshots
//! - **Amount due**: installment plus tax plus a late penalty when overdue
//! - **Gateway**: the registry of charges the payment gateway captured
//! - **Payment application**: a captured charge becomes a transaction and an
//!   installment credited on the policy
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{calculate_due, DueInputs};
//!
//! let due = calculate_due(DueInputs {
//!     installment: policy.installment(),
//!     next_payment_date: policy.next_payment_date(),
//!     today,
//!     tax: settings.tax,
//!     late_penalty: settings.late_penalty,
//!     minimum_payable,
//! })?;
//! ```

pub mod due;
pub mod error;
pub mod gateway;
pub mod payment;
pub mod ports;
pub mod settings;
pub mod transaction;

pub use due::{calculate_due, default_minimum_payable, AmountDue, DueInputs};
pub use error::BillingError;
pub use gateway::{CapturedCharge, ChargeConfirmation, PaymentGateway};
#[cfg(any(test, feature = "mock"))]
pub use gateway::mock::MockPaymentGateway;
pub use payment::{apply_payment, AppliedPayment};
pub use ports::SettingsPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockSettingsPort;
pub use settings::{
    InsuranceSetting, NewInsuranceSetting, NewTaxSetting, SettingsSnapshot, TaxSetting,
};
pub use transaction::{Transaction, TransactionStatus};
