//! Test Data Builders
//!
//! Builders that construct parties, catalog entries and policies with
//! sensible defaults, so a test only states the fields it cares about.
//! Names and emails are generated with `fake` to keep unique constraints
//! happy when several records share one database.

use chrono::NaiveDate;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{AgentId, CustomerId, PlanId, SchemeId};
use domain_party::{Agent, Customer, VerificationStatus};
use domain_policy::{
    InsurancePlan, InsuranceScheme, PaymentInterval, Policy, PolicyBuilder, PolicyError,
};

use crate::fixtures::DateFixtures;

/// Builder for customers, verified and active by default
pub struct TestCustomerBuilder {
    date_of_birth: NaiveDate,
    verification: VerificationStatus,
    active: bool,
}

impl Default for TestCustomerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCustomerBuilder {
    pub fn new() -> Self {
        Self {
            date_of_birth: DateFixtures::adult_birth_date(),
            verification: VerificationStatus::Approved,
            active: true,
        }
    }

    pub fn born(mut self, date_of_birth: NaiveDate) -> Self {
        self.date_of_birth = date_of_birth;
        self
    }

    pub fn verification(mut self, status: VerificationStatus) -> Self {
        self.verification = status;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn build(self) -> Customer {
        let first: String = FirstName().fake();
        let last: String = LastName().fake();
        let email = unique_email();
        let mut customer = Customer::new(first, last, email, self.date_of_birth)
            .with_verification(self.verification);
        customer.active = self.active;
        customer
    }
}

/// An active agent with generated contact details
pub fn test_agent() -> Agent {
    let first: String = FirstName().fake();
    let last: String = LastName().fake();
    Agent::new(first, last, unique_email())
}

fn unique_email() -> String {
    let email: String = SafeEmail().fake();
    // Prefix with a fresh id so repeated fakes never collide
    format!("{}.{}", uuid::Uuid::new_v4().simple(), email)
}

/// Builder for a scheme and one plan under it
pub struct TestPlanBuilder {
    scheme_id: SchemeId,
    commission: Decimal,
    withdrawal_penalty: Decimal,
    terms: (u32, u32),
    ages: (u32, u32),
    investments: (i64, i64),
    profit_ratio: Decimal,
}

impl Default for TestPlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPlanBuilder {
    pub fn new() -> Self {
        Self {
            scheme_id: SchemeId::new_v7(),
            commission: dec!(5),
            withdrawal_penalty: dec!(10),
            terms: (5, 20),
            ages: (18, 60),
            investments: (10_000, 1_000_000),
            profit_ratio: dec!(1.2),
        }
    }

    pub fn commission(mut self, percent: Decimal) -> Self {
        self.commission = percent;
        self
    }

    pub fn withdrawal_penalty(mut self, percent: Decimal) -> Self {
        self.withdrawal_penalty = percent;
        self
    }

    pub fn terms(mut self, min: u32, max: u32) -> Self {
        self.terms = (min, max);
        self
    }

    pub fn ages(mut self, min: u32, max: u32) -> Self {
        self.ages = (min, max);
        self
    }

    pub fn investments(mut self, min: i64, max: i64) -> Self {
        self.investments = (min, max);
        self
    }

    pub fn profit_ratio(mut self, ratio: Decimal) -> Self {
        self.profit_ratio = ratio;
        self
    }

    pub fn build(self) -> (InsuranceScheme, InsurancePlan) {
        let mut scheme = InsuranceScheme::new("Secure Growth", self.commission, self.withdrawal_penalty);
        scheme.id = self.scheme_id;
        let plan = InsurancePlan {
            id: PlanId::new_v7(),
            scheme_id: scheme.id,
            name: "Secure Growth 20".to_string(),
            min_term_years: self.terms.0,
            max_term_years: self.terms.1,
            min_age: self.ages.0,
            max_age: self.ages.1,
            min_investment: self.investments.0,
            max_investment: self.investments.1,
            profit_ratio: self.profit_ratio,
            active: true,
        };
        (scheme, plan)
    }
}

/// Builder for policies: 100_000 over 10 years, paid quarterly from today
pub struct TestPolicyBuilder {
    plan_id: PlanId,
    customer_id: CustomerId,
    agent_id: Option<AgentId>,
    start_date: NaiveDate,
    term_years: u32,
    total_investment: i64,
    interval: PaymentInterval,
}

impl TestPolicyBuilder {
    pub fn new(plan_id: PlanId, customer_id: CustomerId) -> Self {
        Self {
            plan_id,
            customer_id,
            agent_id: None,
            start_date: DateFixtures::today(),
            term_years: 10,
            total_investment: 100_000,
            interval: PaymentInterval::Quarterly,
        }
    }

    pub fn agent(mut self, agent_id: AgentId) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = date;
        self
    }

    pub fn term_years(mut self, years: u32) -> Self {
        self.term_years = years;
        self
    }

    pub fn total_investment(mut self, units: i64) -> Self {
        self.total_investment = units;
        self
    }

    pub fn interval(mut self, interval: PaymentInterval) -> Self {
        self.interval = interval;
        self
    }

    pub fn build(self) -> Result<Policy, PolicyError> {
        PolicyBuilder::new()
            .plan(self.plan_id)
            .customer(self.customer_id)
            .agent(self.agent_id)
            .start_date(self.start_date)
            .term_years(self.term_years)
            .total_investment(self.total_investment)
            .payment_interval(self.interval)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_builder_defaults() {
        let customer = TestCustomerBuilder::new().build();
        assert!(customer.is_verified());
        assert!(customer.active);
        assert!(customer.email.contains('@'));
    }

    #[test]
    fn test_generated_emails_are_unique() {
        let a = TestCustomerBuilder::new().build();
        let b = TestCustomerBuilder::new().build();
        assert_ne!(a.email, b.email);
    }

    #[test]
    fn test_plan_builder_links_scheme() {
        let (scheme, plan) = TestPlanBuilder::new().terms(1, 5).build();
        assert_eq!(plan.scheme_id, scheme.id);
        assert_eq!(plan.max_term_years, 5);
    }

    #[test]
    fn test_policy_builder_defaults() {
        let policy = TestPolicyBuilder::new(PlanId::new(), CustomerId::new())
            .build()
            .unwrap();
        assert_eq!(policy.installment_amount(), 2500);
        assert_eq!(policy.next_payment_date(), DateFixtures::today());
    }
}
