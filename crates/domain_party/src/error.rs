//! Party domain errors

use thiserror::Error;

/// Errors that can occur in the party domain
#[derive(Debug, Error)]
pub enum PartyError {
    /// Customer with the given ID was not found
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Agent with the given ID was not found
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    /// Admin with the given ID was not found
    #[error("Admin not found: {0}")]
    AdminNotFound(String),

    /// Invalid party data provided
    #[error("Invalid party data: {0}")]
    InvalidData(String),

    /// Party validation failed
    #[error("Party validation failed: {0}")]
    ValidationFailed(String),

    /// The party has been deactivated
    #[error("Party is inactive: {0}")]
    InactiveParty(String),
}

impl PartyError {
    /// Creates an InvalidData error with a message
    pub fn invalid(message: impl Into<String>) -> Self {
        PartyError::InvalidData(message.into())
    }

    /// Creates a ValidationFailed error from validation errors
    pub fn validation_failed(errors: Vec<String>) -> Self {
        PartyError::ValidationFailed(errors.join("; "))
    }

    /// Creates an InactiveParty error from any ID type
    pub fn inactive(id: impl std::fmt::Display) -> Self {
        PartyError::InactiveParty(id.to_string())
    }
}
