//! Withdrawal request aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{AdminId, CustomerId, Money, PolicyId, Rate, WithdrawalId};

use crate::error::WithdrawalError;

/// Withdrawal request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "PENDING",
            WithdrawalStatus::Approved => "APPROVED",
            WithdrawalStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalStatus {
    type Err = WithdrawalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(WithdrawalStatus::Pending),
            "APPROVED" => Ok(WithdrawalStatus::Approved),
            "REJECTED" => Ok(WithdrawalStatus::Rejected),
            other => Err(WithdrawalError::UnknownStatus(other.to_string())),
        }
    }
}

/// A customer's request to leave a policy early
///
/// `resolved_by` and `resolved_at` are set together when the request leaves
/// PENDING.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub id: WithdrawalId,
    pub policy_id: PolicyId,
    pub customer_id: CustomerId,
    pub requested_at: DateTime<Utc>,
    pub status: WithdrawalStatus,
    pub resolved_by: Option<AdminId>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// A request before the store assigns its id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWithdrawalRequest {
    pub policy_id: PolicyId,
    pub customer_id: CustomerId,
    pub requested_at: DateTime<Utc>,
}

impl WithdrawalRequest {
    pub fn from_new(id: WithdrawalId, request: NewWithdrawalRequest) -> Self {
        Self {
            id,
            policy_id: request.policy_id,
            customer_id: request.customer_id,
            requested_at: request.requested_at,
            status: WithdrawalStatus::Pending,
            resolved_by: None,
            resolved_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == WithdrawalStatus::Pending
    }

    /// Approves a pending request on behalf of an admin
    pub fn approve(&mut self, admin: AdminId, now: DateTime<Utc>) -> Result<(), WithdrawalError> {
        self.resolve(WithdrawalStatus::Approved, admin, now)
    }

    /// Rejects a pending request on behalf of an admin
    pub fn reject(&mut self, admin: AdminId, now: DateTime<Utc>) -> Result<(), WithdrawalError> {
        self.resolve(WithdrawalStatus::Rejected, admin, now)
    }

    fn resolve(
        &mut self,
        status: WithdrawalStatus,
        admin: AdminId,
        now: DateTime<Utc>,
    ) -> Result<(), WithdrawalError> {
        if !self.is_pending() {
            return Err(WithdrawalError::AlreadyInTerminalState {
                request_id: self.id,
                status: self.status.as_str().to_string(),
            });
        }
        self.status = status;
        self.resolved_by = Some(admin);
        self.resolved_at = Some(now);
        Ok(())
    }
}

/// Estimated payout on an approved withdrawal
///
/// `total_amount_paid × (1 − withdrawal penalty)`
pub fn withdrawal_payout(total_amount_paid: Money, withdrawal_penalty: Rate) -> Money {
    withdrawal_penalty.complement().apply(&total_amount_paid)
}
