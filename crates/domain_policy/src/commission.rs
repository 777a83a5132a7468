//! Agent commission read model
//!
//! A pure reducer over the policies an agent sold. The "commission" is the
//! sum of each scheme's registration-commission percentage, and the
//! withdrawal exposure is the sum of each scheme's withdrawal-penalty
//! percentage. Neither is applied to an amount. Dashboards already display
//! these literal sums, so they are kept as they are.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{PlanId, PolicyId};

use crate::aggregate::Policy;
use crate::catalog::PlanWithScheme;
use crate::schedule::PaymentInterval;

/// One policy sold by an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionLine {
    pub policy_id: PolicyId,
    pub plan_id: PlanId,
    pub plan_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub term_years: u32,
    pub total_investment: i64,
    pub payment_interval: PaymentInterval,
    /// Scheme commission percentage truncated to a whole number
    pub commission: i64,
    pub commission_percentage: Decimal,
    pub withdrawal_penalty: Decimal,
}

/// Dashboard totals for an agent
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommissionSummary {
    pub total_commission: Decimal,
    pub total_withdrawal_exposure: Decimal,
    pub sold_policy_count: u64,
    pub cancelled_policy_count: u64,
}

/// Builds the per-policy lines for an agent's sales
pub fn commission_lines<'a, I>(sold: I) -> Vec<CommissionLine>
where
    I: IntoIterator<Item = (&'a Policy, &'a PlanWithScheme)>,
{
    sold.into_iter()
        .map(|(policy, catalog)| CommissionLine {
            policy_id: policy.id(),
            plan_id: policy.plan_id(),
            plan_name: catalog.plan.name.clone(),
            start_date: policy.start_date(),
            end_date: policy.end_date(),
            term_years: policy.term_years(),
            total_investment: policy.total_investment(),
            payment_interval: policy.payment_interval(),
            commission: catalog
                .scheme
                .new_registration_commission
                .trunc()
                .to_i64()
                .unwrap_or_default(),
            commission_percentage: catalog.scheme.new_registration_commission,
            withdrawal_penalty: catalog.scheme.withdrawal_penalty,
        })
        .collect()
}

/// Folds the lines into dashboard totals
///
/// `approved_withdrawals` is the number of APPROVED withdrawal requests on
/// the agent's policies.
pub fn summarize(lines: &[CommissionLine], approved_withdrawals: u64) -> CommissionSummary {
    lines.iter().fold(
        CommissionSummary {
            cancelled_policy_count: approved_withdrawals,
            ..CommissionSummary::default()
        },
        |mut summary, line| {
            summary.total_commission += line.commission_percentage;
            summary.total_withdrawal_exposure += line.withdrawal_penalty;
            summary.sold_policy_count += 1;
            summary
        },
    )
}
