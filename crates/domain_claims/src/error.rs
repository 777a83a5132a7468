//! Claims domain errors

use thiserror::Error;

use core_kernel::ClaimId;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    /// The claim has already been approved or rejected
    #[error("Claim {claim_id} is already {status}")]
    AlreadyInTerminalState { claim_id: ClaimId, status: String },

    #[error("Invalid claim: {0}")]
    Validation(String),

    #[error("Unknown claim status: {0}")]
    UnknownStatus(String),
}

impl ClaimError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClaimError::Validation(message.into())
    }
}
