//! Withdrawal DTOs

use serde::Deserialize;

use core_kernel::PolicyId;

#[derive(Debug, Deserialize)]
pub struct WithdrawalRequestBody {
    pub policy_id: PolicyId,
}
