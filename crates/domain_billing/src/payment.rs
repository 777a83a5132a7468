//! Payment application
//!
//! Turns a captured charge into a transaction and credits the installment
//! on the policy. The caller persists both together.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use domain_policy::Policy;

use crate::error::BillingError;
use crate::gateway::CapturedCharge;
use crate::transaction::Transaction;

/// The result of applying a payment
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPayment {
    pub transaction: Transaction,
    /// The payment closed the policy at the end of its term
    pub expired: bool,
}

/// Applies a captured charge to a policy
///
/// Checks run before anything is mutated: the captured amount must be
/// positive, then the gateway must report success. The transaction records
/// the captured amount while the policy is credited with its recorded
/// installment amount.
pub fn apply_payment(
    policy: &mut Policy,
    charge: &CapturedCharge,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<AppliedPayment, BillingError> {
    let amount = charge.amount.ensure_positive()?;

    if !charge.succeeded {
        return Err(BillingError::PaymentNotCaptured(format!(
            "charge {} was not successful",
            charge.charge_id
        )));
    }

    let outcome = policy.record_installment(today)?;
    let transaction = Transaction::successful(policy.id(), amount, &charge.charge_id, now);

    debug!(
        policy_id = %policy.id(),
        transaction_id = %transaction.id,
        amount = %amount,
        expired = outcome.expired,
        "Payment applied"
    );

    Ok(AppliedPayment {
        transaction,
        expired: outcome.expired,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{CustomerId, Money, PlanId};
    use domain_policy::{PaymentInterval, PolicyBuilder};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn policy() -> Policy {
        PolicyBuilder::new()
            .plan(PlanId::new())
            .customer(CustomerId::new())
            .start_date(date(2025, 1, 1))
            .term_years(10)
            .total_investment(100_000)
            .payment_interval(PaymentInterval::Quarterly)
            .build()
            .unwrap()
    }

    fn charge(policy: &Policy, amount: Money, succeeded: bool) -> CapturedCharge {
        CapturedCharge {
            charge_id: "ch_1".into(),
            policy_id: policy.id(),
            amount,
            succeeded,
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn test_transaction_records_captured_amount() {
        let mut policy = policy();
        let c = charge(&policy, Money::from_units(2625), true);
        let applied = apply_payment(&mut policy, &c, date(2025, 1, 1), Utc::now()).unwrap();

        assert_eq!(applied.transaction.amount, Money::from_units(2625));
        assert_eq!(policy.total_amount_paid(), Money::from_units(2500));
        assert!(!applied.expired);
    }

    #[test]
    fn test_non_positive_amount_leaves_policy_untouched() {
        let mut policy = policy();
        let c = charge(&policy, Money::zero(), true);
        let result = apply_payment(&mut policy, &c, date(2025, 1, 1), Utc::now());

        assert!(matches!(result, Err(BillingError::InvalidAmount(_))));
        assert_eq!(policy.version(), 1);
        assert!(policy.total_amount_paid().is_zero());
    }

    #[test]
    fn test_failed_capture_rejected() {
        let mut policy = policy();
        let c = charge(&policy, Money::from_units(2625), false);
        let result = apply_payment(&mut policy, &c, date(2025, 1, 1), Utc::now());
        assert!(matches!(result, Err(BillingError::PaymentNotCaptured(_))));
    }
}
