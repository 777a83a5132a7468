//! Lifecycle engine errors
//!
//! Every engine operation fails with one [`LifecycleError`]. Domain and port
//! errors convert into it with `From`, so operations propagate with `?`.

use thiserror::Error;

use core_kernel::{Money, PortError};
use domain_billing::BillingError;
use domain_claims::ClaimError;
use domain_party::PartyError;
use domain_policy::PolicyError;
use domain_withdrawal::WithdrawalError;

/// Errors surfaced by the lifecycle engine
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A referenced entity does not exist
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// An eligibility or bounds check failed
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The actor lacks the required role or relationship
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid payment interval: {0}")]
    InvalidInterval(String),

    /// The computed amount due is under the payable floor
    #[error("Amount due {total} is below the minimum payable amount {minimum}")]
    BelowMinimum { total: Money, minimum: Money },

    /// The policy, claim or withdrawal request has already been resolved
    #[error("Already in a terminal state: {0}")]
    AlreadyInTerminalState(String),

    /// The gateway does not report a successful capture for the charge
    #[error("Payment not captured: {0}")]
    PaymentNotCaptured(String),

    /// A concurrent change won; the caller may retry
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure
    #[error("Port error: {0}")]
    Port(#[source] PortError),
}

impl LifecycleError {
    pub fn not_found(entity_type: impl Into<String>, id: impl std::fmt::Display) -> Self {
        LifecycleError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        LifecycleError::Unauthorized(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        LifecycleError::Validation(message.into())
    }

    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            LifecycleError::NotFound { .. } => "not_found",
            LifecycleError::Validation(_) => "validation_error",
            LifecycleError::Unauthorized(_) => "unauthorized",
            LifecycleError::InvalidAmount(_) => "invalid_amount",
            LifecycleError::InvalidInterval(_) => "invalid_interval",
            LifecycleError::BelowMinimum { .. } => "below_minimum",
            LifecycleError::AlreadyInTerminalState(_) => "already_in_terminal_state",
            LifecycleError::PaymentNotCaptured(_) => "payment_not_captured",
            LifecycleError::Conflict(_) => "conflict",
            LifecycleError::Port(_) => "internal_error",
        }
    }
}

impl From<PortError> for LifecycleError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => LifecycleError::NotFound { entity_type, id },
            PortError::Validation { message, .. } => LifecycleError::Validation(message),
            PortError::Conflict { message } => LifecycleError::Conflict(message),
            PortError::Unauthorized { message } => LifecycleError::Unauthorized(message),
            other => LifecycleError::Port(other),
        }
    }
}

impl From<PolicyError> for LifecycleError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::AlreadyInTerminalState { status } => {
                LifecycleError::AlreadyInTerminalState(format!("policy is {status}"))
            }
            PolicyError::InvalidInterval(interval) => LifecycleError::InvalidInterval(interval),
            PolicyError::InvalidAmount(message) => LifecycleError::InvalidAmount(message),
            other => LifecycleError::Validation(other.to_string()),
        }
    }
}

impl From<BillingError> for LifecycleError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::InvalidAmount(message) => LifecycleError::InvalidAmount(message),
            BillingError::BelowMinimum { total, minimum } => {
                LifecycleError::BelowMinimum { total, minimum }
            }
            BillingError::PaymentNotCaptured(message) => LifecycleError::PaymentNotCaptured(message),
            BillingError::InvalidSetting(message) => LifecycleError::Validation(message),
            BillingError::Policy(inner) => inner.into(),
        }
    }
}

impl From<ClaimError> for LifecycleError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::AlreadyInTerminalState { .. } => {
                LifecycleError::AlreadyInTerminalState(err.to_string())
            }
            other => LifecycleError::Validation(other.to_string()),
        }
    }
}

impl From<WithdrawalError> for LifecycleError {
    fn from(err: WithdrawalError) -> Self {
        match err {
            WithdrawalError::AlreadyInTerminalState { .. } => {
                LifecycleError::AlreadyInTerminalState(err.to_string())
            }
            other => LifecycleError::Validation(other.to_string()),
        }
    }
}

impl From<PartyError> for LifecycleError {
    fn from(err: PartyError) -> Self {
        match err {
            PartyError::CustomerNotFound(id) => LifecycleError::not_found("Customer", id),
            PartyError::AgentNotFound(id) => LifecycleError::not_found("Agent", id),
            PartyError::AdminNotFound(id) => LifecycleError::not_found("Admin", id),
            PartyError::InactiveParty(id) => {
                LifecycleError::unauthorized(format!("{id} is inactive"))
            }
            other => LifecycleError::Validation(other.to_string()),
        }
    }
}
