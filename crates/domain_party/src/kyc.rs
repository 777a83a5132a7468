//! Customer verification (KYC) status

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PartyError;

/// Outcome of the back-office document verification of a customer
///
/// Only `Approved` customers may buy a policy; `Rejected` customers are
/// refused outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    /// Database and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "PENDING",
            VerificationStatus::Approved => "APPROVED",
            VerificationStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(VerificationStatus::Pending),
            "APPROVED" => Ok(VerificationStatus::Approved),
            "REJECTED" => Ok(VerificationStatus::Rejected),
            other => Err(PartyError::invalid(format!("unknown verification status {other}"))),
        }
    }
}
