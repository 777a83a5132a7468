//! Policy domain errors
//!
//! This module defines all error types that can occur within the
//! policy domain.

use thiserror::Error;

use core_kernel::{MoneyError, TemporalError};

use crate::aggregate::PolicyStatus;

/// Errors that can occur in the policy domain
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy already left the ACTIVE state
    #[error("Policy is already {status}")]
    AlreadyInTerminalState {
        status: PolicyStatus,
    },

    /// A prospective policy falls outside the plan's bounds
    #[error("Not eligible: {0}")]
    Ineligible(String),

    /// Payment interval not recognised
    #[error("Invalid payment interval: {0}")]
    InvalidInterval(String),

    /// Malformed amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Required field is missing
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Calendar arithmetic overflowed
    #[error(transparent)]
    Temporal(#[from] TemporalError),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl PolicyError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PolicyError::Validation(message.into())
    }

    /// Creates an eligibility failure
    pub fn ineligible(message: impl Into<String>) -> Self {
        PolicyError::Ineligible(message.into())
    }

    /// Creates an invalid amount error
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        PolicyError::InvalidAmount(message.into())
    }
}

impl From<MoneyError> for PolicyError {
    fn from(err: MoneyError) -> Self {
        match err {
            MoneyError::InvalidAmount(message) => PolicyError::InvalidAmount(message),
            other => PolicyError::Validation(other.to_string()),
        }
    }
}
