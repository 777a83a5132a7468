//! Withdrawal Domain
//!
//! A customer may ask to leave an ACTIVE policy early. An admin approves the
//! request (the policy becomes CANCELLED and the customer is refunded what
//! they paid less the withdrawal penalty) or rejects it. Either way the
//! request resolves exactly once.

pub mod error;
pub mod request;

pub use error::WithdrawalError;
pub use request::{
    withdrawal_payout, NewWithdrawalRequest, WithdrawalRequest, WithdrawalStatus,
};
