//! Policy eligibility
//!
//! A pure gate run before a policy is issued. Checks run in a fixed order
//! and the first failure is reported.

use chrono::NaiveDate;
use tracing::debug;

use domain_party::{Customer, VerificationStatus};

use crate::catalog::InsurancePlan;
use crate::error::PolicyError;

/// Terms a customer asks for when buying a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityRequest {
    pub term_years: u32,
    pub total_investment: i64,
}

/// Validates a prospective policy against a plan
///
/// Fails with `PolicyError::Ineligible` when the plan is inactive, the
/// customer is not verified, or the term, age or investment falls outside
/// the plan's inclusive bounds. Age is taken in completed years on `today`.
pub fn check_eligibility(
    customer: &Customer,
    plan: &InsurancePlan,
    request: EligibilityRequest,
    today: NaiveDate,
) -> Result<(), PolicyError> {
    if !plan.active {
        return Err(PolicyError::ineligible(format!("plan {} is not active", plan.id)));
    }

    match customer.verification_status {
        VerificationStatus::Approved => {}
        VerificationStatus::Rejected => {
            return Err(PolicyError::ineligible(format!(
                "customer {} failed verification",
                customer.id
            )));
        }
        VerificationStatus::Pending => {
            return Err(PolicyError::ineligible(format!(
                "customer {} is not yet verified",
                customer.id
            )));
        }
    }

    if !plan.term_bounds().contains(&request.term_years) {
        return Err(PolicyError::ineligible(format!(
            "term of {} years outside {}..={}",
            request.term_years, plan.min_term_years, plan.max_term_years
        )));
    }

    let age = customer.age_on(today);
    let within_age = u32::try_from(age)
        .map(|age| plan.age_bounds().contains(&age))
        .unwrap_or(false);
    if !within_age {
        return Err(PolicyError::ineligible(format!(
            "age {age} outside {}..={}",
            plan.min_age, plan.max_age
        )));
    }

    if !plan.investment_bounds().contains(&request.total_investment) {
        return Err(PolicyError::ineligible(format!(
            "investment {} outside {}..={}",
            request.total_investment, plan.min_investment, plan.max_investment
        )));
    }

    debug!(customer_id = %customer.id, plan_id = %plan.id, age, "Eligibility check passed");
    Ok(())
}
