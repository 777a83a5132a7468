//! Catalog reference data
//!
//! Schemes carry the percentages an agent earns on a sale and a customer
//! forfeits on early withdrawal; plans under a scheme carry the eligibility
//! bounds and the profit ratio used to estimate the maturity payout. The
//! engine only reads this data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use core_kernel::{Money, PlanId, SchemeId};

/// An insurance scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceScheme {
    pub id: SchemeId,
    pub name: String,
    /// Percentage paid to the selling agent on a new registration
    pub new_registration_commission: Decimal,
    /// Percentage forfeited when a customer withdraws early
    pub withdrawal_penalty: Decimal,
    pub active: bool,
}

impl InsuranceScheme {
    pub fn new(
        name: impl Into<String>,
        new_registration_commission: Decimal,
        withdrawal_penalty: Decimal,
    ) -> Self {
        Self {
            id: SchemeId::new_v7(),
            name: name.into(),
            new_registration_commission,
            withdrawal_penalty,
            active: true,
        }
    }
}

/// An insurance plan with its eligibility bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsurancePlan {
    pub id: PlanId,
    pub scheme_id: SchemeId,
    pub name: String,
    pub min_term_years: u32,
    pub max_term_years: u32,
    pub min_age: u32,
    pub max_age: u32,
    pub min_investment: i64,
    pub max_investment: i64,
    /// Multiplier applied to the total investment to estimate the maturity payout
    pub profit_ratio: Decimal,
    pub active: bool,
}

impl InsurancePlan {
    pub fn term_bounds(&self) -> RangeInclusive<u32> {
        self.min_term_years..=self.max_term_years
    }

    pub fn age_bounds(&self) -> RangeInclusive<u32> {
        self.min_age..=self.max_age
    }

    pub fn investment_bounds(&self) -> RangeInclusive<i64> {
        self.min_investment..=self.max_investment
    }

    /// Estimated payout when a policy under this plan reaches term
    pub fn maturity_payout(&self, total_investment: i64) -> Money {
        Money::from_units(total_investment).multiply(self.profit_ratio)
    }
}

/// A plan together with the scheme it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanWithScheme {
    pub plan: InsurancePlan,
    pub scheme: InsuranceScheme,
}
