//! Installment scheduling
//!
//! A policy's total investment is split into equal whole-unit installments
//! using integer division. The remainder is never redistributed: the schedule
//! under-collects by at most `installment_count - 1` units, and callers must
//! not try to "fix" that slack.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::temporal::add_months;

use crate::error::PolicyError;

/// How often installments fall due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentInterval {
    /// One installment per year
    Yearly,
    /// Two installments per year
    HalfYearly,
    /// Four installments per year
    Quarterly,
}

impl PaymentInterval {
    /// Returns the number of installments per year
    pub fn payments_per_year(&self) -> u32 {
        match self {
            PaymentInterval::Yearly => 1,
            PaymentInterval::HalfYearly => 2,
            PaymentInterval::Quarterly => 4,
        }
    }

    /// Months between consecutive due dates
    pub fn months(&self) -> u32 {
        12 / self.payments_per_year()
    }

    /// Database and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentInterval::Yearly => "YEARLY",
            PaymentInterval::HalfYearly => "HALF_YEARLY",
            PaymentInterval::Quarterly => "QUARTERLY",
        }
    }

    /// Moves a due date forward by one interval
    ///
    /// Month-end dates clamp, so a policy started on 31 January falls due
    /// on 30 April and then on 30 July.
    pub fn advance(&self, due: NaiveDate) -> Result<NaiveDate, PolicyError> {
        Ok(add_months(due, self.months())?)
    }
}

impl fmt::Display for PaymentInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentInterval {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "YEARLY" => Ok(PaymentInterval::Yearly),
            "HALF_YEARLY" => Ok(PaymentInterval::HalfYearly),
            "QUARTERLY" => Ok(PaymentInterval::Quarterly),
            _ => Err(PolicyError::InvalidInterval(s.to_string())),
        }
    }
}

/// Result of splitting an investment into installments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentSchedule {
    /// Whole-unit amount due each interval
    pub installment_amount: i64,
    /// Installments per year
    pub payments_per_year: u32,
    /// Installments over the whole term
    pub installment_count: u32,
}

impl InstallmentSchedule {
    /// Units of the investment that the schedule never collects
    pub fn shortfall(&self, total_investment: i64) -> i64 {
        total_investment - self.installment_amount * i64::from(self.installment_count)
    }
}

/// Derives the installment amount for a policy
///
/// `installment = total_investment / (term_years * payments_per_year)` with
/// integer division.
///
/// # Errors
///
/// `Validation` for a zero term, `InvalidAmount` for a non-positive
/// investment.
pub fn schedule_installments(
    total_investment: i64,
    term_years: u32,
    interval: PaymentInterval,
) -> Result<InstallmentSchedule, PolicyError> {
    if total_investment <= 0 {
        return Err(PolicyError::invalid_amount(format!(
            "total investment must be positive, got {total_investment}"
        )));
    }
    if term_years == 0 {
        return Err(PolicyError::validation("policy term must be at least one year"));
    }

    let payments_per_year = interval.payments_per_year();
    let installment_count = term_years
        .checked_mul(payments_per_year)
        .ok_or_else(|| PolicyError::validation("policy term too long"))?;

    Ok(InstallmentSchedule {
        installment_amount: total_investment / i64::from(installment_count),
        payments_per_year,
        installment_count,
    })
}
