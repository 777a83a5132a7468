//! Commission read model and catalog port tests

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{AgentId, CustomerId, PlanId};
use domain_policy::{
    commission_lines, summarize, CatalogPort, InsurancePlan, InsuranceScheme, MockCatalogPort,
    PaymentInterval, PlanWithScheme, Policy, PolicyBuilder,
};

fn catalog(commission: rust_decimal::Decimal, penalty: rust_decimal::Decimal) -> PlanWithScheme {
    let scheme = InsuranceScheme::new("Scheme", commission, penalty);
    let plan = InsurancePlan {
        id: PlanId::new(),
        scheme_id: scheme.id,
        name: "Plan".into(),
        min_term_years: 1,
        max_term_years: 30,
        min_age: 18,
        max_age: 65,
        min_investment: 1_000,
        max_investment: 10_000_000,
        profit_ratio: dec!(1.2),
        active: true,
    };
    PlanWithScheme { plan, scheme }
}

fn sold(catalog: &PlanWithScheme, agent: AgentId) -> Policy {
    PolicyBuilder::new()
        .plan(catalog.plan.id)
        .customer(CustomerId::new())
        .agent(Some(agent))
        .start_date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
        .term_years(5)
        .total_investment(50_000)
        .payment_interval(PaymentInterval::Yearly)
        .build()
        .unwrap()
}

// ============================================================================
// Commission Tests
// ============================================================================

mod commission_tests {
    use super::*;

    #[test]
    fn test_summary_sums_percentages_literally() {
        let agent = AgentId::new();
        let gold = catalog(dec!(7.5), dec!(10));
        let silver = catalog(dec!(5), dec!(12.5));
        let p1 = sold(&gold, agent);
        let p2 = sold(&silver, agent);

        let lines = commission_lines([(&p1, &gold), (&p2, &silver)]);
        let summary = summarize(&lines, 1);

        assert_eq!(summary.total_commission, dec!(12.5));
        assert_eq!(summary.total_withdrawal_exposure, dec!(22.5));
        assert_eq!(summary.sold_policy_count, 2);
        assert_eq!(summary.cancelled_policy_count, 1);
    }

    #[test]
    fn test_line_truncates_commission() {
        let agent = AgentId::new();
        let gold = catalog(dec!(7.9), dec!(10));
        let policy = sold(&gold, agent);

        let lines = commission_lines([(&policy, &gold)]);
        assert_eq!(lines[0].commission, 7);
        assert_eq!(lines[0].policy_id, policy.id());
        assert_eq!(lines[0].total_investment, 50_000);
    }

    #[test]
    fn test_no_sales() {
        let summary = summarize(&[], 0);
        assert_eq!(summary.sold_policy_count, 0);
        assert_eq!(summary.total_commission, dec!(0));
    }
}

// ============================================================================
// Catalog Port Tests
// ============================================================================

mod catalog_port_tests {
    use super::*;

    #[tokio::test]
    async fn test_plan_with_scheme() {
        let port = MockCatalogPort::new();
        let entry = catalog(dec!(5), dec!(10));
        port.save_scheme(entry.scheme.clone()).await.unwrap();
        port.save_plan(entry.plan.clone()).await.unwrap();

        let loaded = port.get_plan_with_scheme(entry.plan.id).await.unwrap();
        assert_eq!(loaded, entry);
    }

    #[tokio::test]
    async fn test_plan_requires_scheme() {
        let port = MockCatalogPort::new();
        let entry = catalog(dec!(5), dec!(10));
        assert!(port.save_plan(entry.plan).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_plan() {
        let port = MockCatalogPort::new();
        assert!(port.get_plan(PlanId::new()).await.unwrap_err().is_not_found());
    }
}
