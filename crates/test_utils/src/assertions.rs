//! Custom Test Assertions
//!
//! Assertion helpers with messages that name the lifecycle concept being
//! checked rather than dumping two opaque values.

use rust_decimal::Decimal;

use core_kernel::{Money, PortError};
use domain_policy::{Policy, PolicyStatus};

/// Asserts a money value equals a decimal amount exactly
pub fn assert_money_eq(actual: Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Expected {}, got {}",
        Money::new(expected),
        actual
    );
}

/// Asserts that two money values differ by no more than `tolerance`
pub fn assert_money_approx_eq(actual: Money, expected: Money, tolerance: Decimal) {
    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts a money value carries no more than two decimal places
pub fn assert_whole_cents(money: Money) {
    assert_eq!(
        money.round_to_cents(),
        money,
        "Expected a whole-cent amount, got {}",
        money.amount()
    );
}

/// Asserts a policy's stored status
pub fn assert_policy_status(policy: &Policy, expected: PolicyStatus) {
    assert_eq!(
        policy.status(),
        expected,
        "Policy {} is {}, expected {}",
        policy.id(),
        policy.status(),
        expected
    );
}

/// Asserts the paid total equals installments paid times the installment
pub fn assert_paid_installments(policy: &Policy, installments: i64) {
    let expected = Money::from_units(policy.installment_amount() * installments);
    assert_eq!(
        policy.total_amount_paid(),
        expected,
        "Policy {} has {} paid, expected {} installments ({})",
        policy.id(),
        policy.total_amount_paid(),
        installments,
        expected
    );
}

/// Asserts a port call failed because a concurrent writer won
pub fn assert_conflict<T: std::fmt::Debug>(result: Result<T, PortError>) {
    match result {
        Err(PortError::Conflict { .. }) => {}
        other => panic!("Expected a conflict, got {:?}", other),
    }
}

/// Asserts a port call failed because the entity does not exist
pub fn assert_not_found<T: std::fmt::Debug>(result: Result<T, PortError>) {
    match result {
        Err(PortError::NotFound { .. }) => {}
        other => panic!("Expected not found, got {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_approx_eq_within_tolerance() {
        assert_money_approx_eq(
            Money::new(dec!(100.004)),
            Money::new(dec!(100.00)),
            dec!(0.005),
        );
    }

    #[test]
    #[should_panic(expected = "differ by more than tolerance")]
    fn test_money_approx_eq_outside_tolerance() {
        assert_money_approx_eq(Money::new(dec!(100.02)), Money::new(dec!(100.00)), dec!(0.01));
    }

    #[test]
    fn test_conflict_assertion_accepts_conflict() {
        assert_conflict::<()>(Err(PortError::conflict("stale version")));
    }

    #[test]
    #[should_panic(expected = "Expected not found")]
    fn test_not_found_assertion_rejects_success() {
        assert_not_found(Ok::<_, PortError>(1));
    }
}
