//! Values returned by engine operations

use serde::{Deserialize, Serialize};

use core_kernel::Money;
use domain_billing::{InsuranceSetting, TaxSetting, Transaction};
use domain_claims::Claim;
use domain_policy::{Policy, PolicyRecord, PolicyStatus};
use domain_withdrawal::WithdrawalRequest;

/// A policy as seen by readers
///
/// `effective_status` reports an ACTIVE policy past its end date as EXPIRED.
/// The stored status only changes on the next payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyView {
    #[serde(flatten)]
    pub policy: PolicyRecord,
    pub effective_status: PolicyStatus,
}

impl PolicyView {
    pub fn new(policy: &Policy, today: chrono::NaiveDate) -> Self {
        Self {
            policy: policy.to_record(),
            effective_status: policy.effective_status(today),
        }
    }
}

/// Outcome of a confirmed payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub transaction: Transaction,
    pub policy: PolicyView,
    /// The payment closed the policy at the end of its term
    pub expired: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimResolution {
    pub claim: Claim,
    /// Estimated payout, only for approvals
    pub payout: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalResolution {
    pub request: WithdrawalRequest,
    /// Estimated payout, only for approvals
    pub payout: Option<Money>,
}

/// Current setting snapshots; `None` when nothing was ever published
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentSettings {
    pub tax: Option<TaxSetting>,
    pub insurance: Option<InsuranceSetting>,
}
