//! Pre-built Test Fixtures
//!
//! Consistent, predictable values for unit and integration tests. Dates are
//! calendar dates because the lifecycle reasons in days, not instants.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use core_kernel::{AdminId, AgentId, CustomerId, Money, PlanId, PolicyId, SchemeId};

static FIXED_CUSTOMER_ID: Lazy<CustomerId> =
    Lazy::new(|| CustomerId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440001)));
static FIXED_AGENT_ID: Lazy<AgentId> =
    Lazy::new(|| AgentId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440002)));
static FIXED_ADMIN_ID: Lazy<AdminId> =
    Lazy::new(|| AdminId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440003)));
static FIXED_SCHEME_ID: Lazy<SchemeId> =
    Lazy::new(|| SchemeId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440004)));
static FIXED_PLAN_ID: Lazy<PlanId> =
    Lazy::new(|| PlanId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440005)));
static FIXED_POLICY_ID: Lazy<PolicyId> =
    Lazy::new(|| PolicyId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440006)));

/// Builds a date from literal parts
///
/// Panics on an impossible date; only meant for literals in tests.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// Fixture for calendar test data
pub struct DateFixtures;

impl DateFixtures {
    /// The standard "today" of a test
    pub fn today() -> NaiveDate {
        date(2025, 1, 15)
    }

    /// Date of birth of a 31-year-old on [`DateFixtures::today`]
    pub fn adult_birth_date() -> NaiveDate {
        date(1994, 1, 1)
    }

    /// Date of birth of someone who is 17 on [`DateFixtures::today`]
    pub fn minor_birth_date() -> NaiveDate {
        date(2007, 6, 15)
    }
}

/// Fixture for money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A quarterly installment of 100_000 over 10 years
    pub fn quarterly_installment() -> Money {
        Money::from_units(2500)
    }

    /// The same installment with 5% tax
    pub fn taxed_installment() -> Money {
        Money::new(dec!(2625.00))
    }

    /// The default floor below which nothing is payable
    pub fn minimum_payable() -> Money {
        Money::new(dec!(40.00))
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    pub fn customer_id() -> CustomerId {
        *FIXED_CUSTOMER_ID
    }

    pub fn agent_id() -> AgentId {
        *FIXED_AGENT_ID
    }

    pub fn admin_id() -> AdminId {
        *FIXED_ADMIN_ID
    }

    pub fn scheme_id() -> SchemeId {
        *FIXED_SCHEME_ID
    }

    pub fn plan_id() -> PlanId {
        *FIXED_PLAN_ID
    }

    pub fn policy_id() -> PolicyId {
        *FIXED_POLICY_ID
    }
}

/// Fixture for percentage settings, in percentage points
pub struct RateFixtures;

impl RateFixtures {
    pub fn tax() -> Decimal {
        dec!(5)
    }

    pub fn claim_deduction() -> Decimal {
        dec!(25)
    }

    pub fn withdrawal_penalty() -> Decimal {
        dec!(10)
    }

    pub fn late_penalty() -> Decimal {
        dec!(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_ids_are_stable() {
        assert_eq!(IdFixtures::policy_id(), IdFixtures::policy_id());
        assert_ne!(
            IdFixtures::customer_id().as_uuid(),
            IdFixtures::agent_id().as_uuid()
        );
    }

    #[test]
    fn test_birth_dates_straddle_adulthood() {
        let today = DateFixtures::today();
        assert_eq!(core_kernel::temporal::age_in_years(DateFixtures::minor_birth_date(), today), 17);
        assert_eq!(core_kernel::temporal::age_in_years(DateFixtures::adult_birth_date(), today), 31);
    }
}
