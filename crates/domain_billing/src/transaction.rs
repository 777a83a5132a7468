//! Payment transactions
//!
//! One transaction is appended per captured charge. The log is never
//! updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{Money, PolicyId, TransactionId};

use crate::error::BillingError;

/// Outcome recorded on a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Successful,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Successful => "SUCCESSFUL",
            TransactionStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESSFUL" => Ok(TransactionStatus::Successful),
            "FAILED" => Ok(TransactionStatus::Failed),
            other => Err(BillingError::InvalidAmount(format!("unknown transaction status {other}"))),
        }
    }
}

/// An immutable record of a captured payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub policy_id: PolicyId,
    /// The amount the gateway confirmed
    pub amount: Money,
    /// Gateway charge reference; each charge settles at most one installment
    pub charge_id: String,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
}

impl Transaction {
    /// Records a successfully captured charge
    pub fn successful(
        policy_id: PolicyId,
        amount: Money,
        charge_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new_v7(),
            policy_id,
            amount,
            charge_id: charge_id.into(),
            timestamp,
            status: TransactionStatus::Successful,
        }
    }
}
