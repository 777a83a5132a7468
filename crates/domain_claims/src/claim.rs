//! Claim aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AdminId, ClaimId, CustomerId, DocumentId, Money, PolicyId, Rate};

use crate::error::ClaimError;

/// Longest explanation accepted on a claim
pub const MAX_EXPLANATION_LEN: usize = 2000;

/// Claim status
///
/// PENDING resolves exactly once, to APPROVED or REJECTED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    Pending,
    Approved {
        resolved_by: AdminId,
        resolved_at: DateTime<Utc>,
    },
    Rejected {
        resolved_by: AdminId,
        resolved_at: DateTime<Utc>,
    },
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "PENDING",
            ClaimStatus::Approved { .. } => "APPROVED",
            ClaimStatus::Rejected { .. } => "REJECTED",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ClaimStatus::Pending)
    }

    /// Rebuilds a status from its persisted columns
    pub fn from_parts(
        status: &str,
        resolved_by: Option<AdminId>,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<Self, ClaimError> {
        match (status, resolved_by, resolved_at) {
            ("PENDING", _, _) => Ok(ClaimStatus::Pending),
            ("APPROVED", Some(resolved_by), Some(resolved_at)) => Ok(ClaimStatus::Approved {
                resolved_by,
                resolved_at,
            }),
            ("REJECTED", Some(resolved_by), Some(resolved_at)) => Ok(ClaimStatus::Rejected {
                resolved_by,
                resolved_at,
            }),
            (other, _, _) => Err(ClaimError::UnknownStatus(other.to_string())),
        }
    }

    /// Who resolved the claim and when
    pub fn resolution(&self) -> Option<(AdminId, DateTime<Utc>)> {
        match *self {
            ClaimStatus::Pending => None,
            ClaimStatus::Approved { resolved_by, resolved_at }
            | ClaimStatus::Rejected { resolved_by, resolved_at } => Some((resolved_by, resolved_at)),
        }
    }
}

/// A claim submitted by a customer, before the store assigns its id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClaim {
    pub policy_id: PolicyId,
    pub customer_id: CustomerId,
    pub explanation: String,
    pub document_ids: Vec<DocumentId>,
    pub submitted_at: DateTime<Utc>,
}

impl NewClaim {
    pub fn validate(&self) -> Result<(), ClaimError> {
        let explanation = self.explanation.trim();
        if explanation.is_empty() {
            return Err(ClaimError::validation("explanation must not be empty"));
        }
        if explanation.chars().count() > MAX_EXPLANATION_LEN {
            return Err(ClaimError::validation(format!(
                "explanation longer than {MAX_EXPLANATION_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// A claim against a policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub policy_id: PolicyId,
    pub customer_id: CustomerId,
    pub explanation: String,
    pub document_ids: Vec<DocumentId>,
    pub status: ClaimStatus,
    pub submitted_at: DateTime<Utc>,
}

impl Claim {
    /// Assigns a store id to a submitted claim
    pub fn from_new(id: ClaimId, claim: NewClaim) -> Self {
        Self {
            id,
            policy_id: claim.policy_id,
            customer_id: claim.customer_id,
            explanation: claim.explanation,
            document_ids: claim.document_ids,
            status: ClaimStatus::Pending,
            submitted_at: claim.submitted_at,
        }
    }

    /// Approves a pending claim
    pub fn approve(&mut self, admin: AdminId, now: DateTime<Utc>) -> Result<(), ClaimError> {
        self.ensure_pending()?;
        self.status = ClaimStatus::Approved {
            resolved_by: admin,
            resolved_at: now,
        };
        Ok(())
    }

    /// Rejects a pending claim
    pub fn reject(&mut self, admin: AdminId, now: DateTime<Utc>) -> Result<(), ClaimError> {
        self.ensure_pending()?;
        self.status = ClaimStatus::Rejected {
            resolved_by: admin,
            resolved_at: now,
        };
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), ClaimError> {
        if self.status.is_pending() {
            Ok(())
        } else {
            Err(ClaimError::AlreadyInTerminalState {
                claim_id: self.id,
                status: self.status.as_str().to_string(),
            })
        }
    }
}

/// Estimated payout on an approved claim
///
/// `total_investment × (1 − claim deduction)`
pub fn claim_payout(total_investment: i64, claim_deduction: Rate) -> Money {
    claim_deduction
        .complement()
        .apply(&Money::from_units(total_investment))
}
