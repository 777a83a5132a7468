//! Billing domain errors

use thiserror::Error;

use core_kernel::{Money, MoneyError};
use domain_policy::PolicyError;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Zero, negative or otherwise unusable amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The amount due is under the payable floor
    #[error("Amount due {total} is below the minimum payable amount {minimum}")]
    BelowMinimum {
        total: Money,
        minimum: Money,
    },

    /// The gateway did not capture the charge
    #[error("Payment not captured: {0}")]
    PaymentNotCaptured(String),

    /// A setting percentage outside 0..=100
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    /// The policy refused the installment
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

impl BillingError {
    /// Creates an InvalidAmount error
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        BillingError::InvalidAmount(message.into())
    }
}

impl From<MoneyError> for BillingError {
    fn from(err: MoneyError) -> Self {
        match err {
            MoneyError::InvalidAmount(message) => BillingError::InvalidAmount(message),
            MoneyError::InvalidPercentage(value) => {
                BillingError::InvalidSetting(format!("percentage {value} must lie between 0 and 100"))
            }
            other => BillingError::InvalidAmount(other.to_string()),
        }
    }
}
