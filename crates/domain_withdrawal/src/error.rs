//! Withdrawal domain errors

use thiserror::Error;

use core_kernel::WithdrawalId;

/// Errors that can occur in the withdrawal domain
#[derive(Debug, Error)]
pub enum WithdrawalError {
    /// The request has already been approved or rejected
    #[error("Withdrawal request {request_id} is already {status}")]
    AlreadyInTerminalState {
        request_id: WithdrawalId,
        status: String,
    },

    #[error("Unknown withdrawal status: {0}")]
    UnknownStatus(String),
}
