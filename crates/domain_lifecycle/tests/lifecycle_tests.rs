//! End-to-end tests of the lifecycle engine over in-memory adapters

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{AdminId, AgentId, DocumentId, Money, PlanId, PolicyId};
use domain_billing::ChargeConfirmation;
use domain_claims::ClaimStatus;
use domain_lifecycle::harness::Harness;
use domain_lifecycle::{
    ClaimSubmission, LifecycleError, LifecycleStore, MockNotifier, Notification,
    PolicyApplication, PolicyUpdate,
};
use domain_party::{PartyPort, VerificationStatus};
use domain_policy::{CatalogPort, InsurancePlan, PaymentInterval, Policy, PolicyStatus};
use domain_withdrawal::WithdrawalStatus;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn application(customer: &domain_party::Customer, plan_id: PlanId) -> PolicyApplication {
    PolicyApplication {
        customer_id: customer.id,
        plan_id,
        term_years: 10,
        total_investment: 100_000,
        payment_interval: PaymentInterval::Quarterly,
        agent_id: None,
    }
}

/// An approved customer holding a 10-year, 100000, quarterly policy issued
/// on 2025-01-15
async fn issued(h: &Harness) -> (domain_party::Customer, Policy) {
    let customer = h.customer().await.unwrap();
    let offer = h.plan().await.unwrap();
    let policy = h
        .engine
        .create_policy(application(&customer, offer.plan.id))
        .await
        .unwrap();
    (customer, policy)
}

async fn pay(h: &Harness, policy_id: PolicyId) -> Result<domain_lifecycle::PaymentReceipt, LifecycleError> {
    let due = h.engine.quote_installment(policy_id).await?;
    let confirmation = h.capture(policy_id, due.total).await;
    h.engine.confirm_payment(policy_id, confirmation).await
}

// ============================================================================
// Issuance
// ============================================================================

mod issuance_tests {
    use super::*;

    #[tokio::test]
    async fn test_policy_starts_today_with_first_installment_due() {
        let h = Harness::on(date(2025, 1, 15));
        let (customer, policy) = issued(&h).await;

        assert_eq!(policy.installment_amount(), 2500);
        assert_eq!(policy.start_date(), date(2025, 1, 15));
        assert_eq!(policy.end_date(), date(2035, 1, 15));
        assert_eq!(policy.next_payment_date(), date(2025, 1, 15));
        assert_eq!(policy.total_amount_paid(), Money::zero());
        assert_eq!(policy.status(), PolicyStatus::Active);

        let stored = h.engine.policies_by_customer(customer.id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].policy.id, policy.id());
    }

    #[tokio::test]
    async fn test_seventeen_year_old_is_rejected() {
        let h = Harness::on(date(2025, 6, 14));
        let customer = h.customer_born(date(2007, 6, 15)).await.unwrap();
        let offer = h.plan().await.unwrap();

        let err = h
            .engine
            .create_policy(application(&customer, offer.plan.id))
            .await
            .unwrap_err();

        assert!(matches!(err, LifecycleError::Validation(ref msg) if msg.contains("age 17")));
        assert!(h.engine.policies_by_customer(customer.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unverified_customers_cannot_register() {
        let h = Harness::on(date(2025, 1, 15));
        let offer = h.plan().await.unwrap();

        for status in [VerificationStatus::Pending, VerificationStatus::Rejected] {
            let customer = h.customer().await.unwrap();
            h.parties
                .update_verification_status(customer.id, status)
                .await
                .unwrap();

            let err = h
                .engine
                .create_policy(application(&customer, offer.plan.id))
                .await
                .unwrap_err();
            assert!(matches!(err, LifecycleError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_missing_references_are_not_found() {
        let h = Harness::on(date(2025, 1, 15));
        let customer = h.customer().await.unwrap();
        let offer = h.plan().await.unwrap();

        let err = h
            .engine
            .create_policy(application(&customer, PlanId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { ref entity_type, .. } if entity_type == "InsurancePlan"));

        let mut with_agent = application(&customer, offer.plan.id);
        with_agent.agent_id = Some(AgentId::new());
        let err = h.engine.create_policy(with_agent).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_inactive_customer_is_unauthorized() {
        let h = Harness::on(date(2025, 1, 15));
        let mut customer = h.customer().await.unwrap();
        customer.active = false;
        let customer = h.parties.save_customer(customer).await.unwrap();
        let offer = h.plan().await.unwrap();

        let err = h
            .engine
            .create_policy(application(&customer, offer.plan.id))
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_term_outside_plan_bounds() {
        let h = Harness::on(date(2025, 1, 15));
        let customer = h.customer().await.unwrap();
        let offer = h.plan().await.unwrap();

        let mut long = application(&customer, offer.plan.id);
        long.term_years = 25;
        let err = h.engine.create_policy(long).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
    }
}

// ============================================================================
// Installments and payments
// ============================================================================

mod payment_tests {
    use super::*;

    #[tokio::test]
    async fn test_three_quarterly_payments() {
        let h = Harness::on(date(2025, 1, 15));
        let (_, policy) = issued(&h).await;

        for due_on in [date(2025, 1, 15), date(2025, 4, 15), date(2025, 7, 15)] {
            h.clock.set_date(due_on);
            pay(&h, policy.id()).await.unwrap();
        }

        let view = h.engine.policy_by_id(policy.id()).await.unwrap();
        assert_eq!(view.policy.total_amount_paid, Money::from_units(7500));
        assert_eq!(view.policy.next_payment_date, date(2025, 10, 15));
        assert_eq!(view.policy.status, PolicyStatus::Active);

        let transactions = h.engine.transactions_for_policy(policy.id()).await.unwrap();
        assert_eq!(transactions.len(), 3);
    }

    #[tokio::test]
    async fn test_quote_adds_tax_and_late_penalty() {
        let h = Harness::on(date(2025, 1, 15));
        h.rates(dec!(5), dec!(0), dec!(0), dec!(2)).await.unwrap();
        let (_, policy) = issued(&h).await;

        let on_time = h.engine.quote_installment(policy.id()).await.unwrap();
        assert_eq!(on_time.total.amount(), dec!(2625.00));
        assert!(!on_time.overdue);

        h.clock.set_date(date(2025, 1, 16));
        let late = h.engine.quote_installment(policy.id()).await.unwrap();
        assert_eq!(late.total.amount(), dec!(2675.00));
        assert!(late.overdue);
    }

    #[tokio::test]
    async fn test_quote_without_settings_is_the_bare_installment() {
        let h = Harness::on(date(2025, 1, 15));
        let (_, policy) = issued(&h).await;

        let due = h.engine.quote_installment(policy.id()).await.unwrap();
        assert_eq!(due.total.amount(), dec!(2500.00));
    }

    #[tokio::test]
    async fn test_micro_installments_are_below_minimum() {
        let h = Harness::on(date(2025, 1, 15));
        let customer = h.customer().await.unwrap();
        let offer = h.plan().await.unwrap();
        let small = h
            .catalog
            .save_plan(InsurancePlan {
                id: PlanId::new(),
                min_investment: 100,
                ..offer.plan.clone()
            })
            .await
            .unwrap();

        let policy = h
            .engine
            .create_policy(PolicyApplication {
                total_investment: 1_000,
                ..application(&customer, small.id)
            })
            .await
            .unwrap();
        assert_eq!(policy.installment_amount(), 25);

        let err = h.engine.quote_installment(policy.id()).await.unwrap_err();
        assert!(matches!(err, LifecycleError::BelowMinimum { .. }));
    }

    #[tokio::test]
    async fn test_non_positive_amount_records_nothing() {
        let h = Harness::on(date(2025, 1, 15));
        let (_, policy) = issued(&h).await;

        let confirmation = h.capture(policy.id(), Money::zero()).await;
        let err = h
            .engine
            .confirm_payment(policy.id(), confirmation)
            .await
            .unwrap_err();

        assert!(matches!(err, LifecycleError::InvalidAmount(_)));
        assert!(h.engine.transactions_for_policy(policy.id()).await.unwrap().is_empty());
        let view = h.engine.policy_by_id(policy.id()).await.unwrap();
        assert_eq!(view.policy.total_amount_paid, Money::zero());
        assert_eq!(view.policy.version, policy.version());
    }

    #[tokio::test]
    async fn test_failed_or_unknown_charges_are_not_captured() {
        let h = Harness::on(date(2025, 1, 15));
        let (_, policy) = issued(&h).await;

        let failed = h
            .failed_capture(policy.id(), Money::from_units(2500))
            .await
            .unwrap();
        let err = h.engine.confirm_payment(policy.id(), failed).await.unwrap_err();
        assert!(matches!(err, LifecycleError::PaymentNotCaptured(_)));

        let forged = ChargeConfirmation {
            charge_id: "ch_forged".to_string(),
        };
        let err = h.engine.confirm_payment(policy.id(), forged).await.unwrap_err();
        assert!(matches!(err, LifecycleError::PaymentNotCaptured(_)));

        assert!(h.engine.transactions_for_policy(policy.id()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_charge_for_another_policy_is_refused() {
        let h = Harness::on(date(2025, 1, 15));
        let (_, first) = issued(&h).await;
        let (_, second) = issued(&h).await;

        let confirmation = h.capture(first.id(), Money::from_units(2500)).await;
        let err = h
            .engine
            .confirm_payment(second.id(), confirmation)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_replayed_charge_conflicts() {
        let h = Harness::on(date(2025, 1, 15));
        let (_, policy) = issued(&h).await;

        let confirmation = h.capture(policy.id(), Money::from_units(2500)).await;
        h.engine
            .confirm_payment(policy.id(), confirmation.clone())
            .await
            .unwrap();
        let err = h
            .engine
            .confirm_payment(policy.id(), confirmation)
            .await
            .unwrap_err();

        assert!(matches!(err, LifecycleError::Conflict(_)));
        assert_eq!(h.engine.transactions_for_policy(policy.id()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transaction_keeps_captured_amount() {
        let h = Harness::on(date(2025, 1, 15));
        h.rates(dec!(5), dec!(0), dec!(0), dec!(0)).await.unwrap();
        let (_, policy) = issued(&h).await;

        let receipt = pay(&h, policy.id()).await.unwrap();

        assert_eq!(receipt.transaction.amount.amount(), dec!(2625.00));
        assert_eq!(receipt.policy.policy.total_amount_paid, Money::from_units(2500));
    }

    #[tokio::test]
    async fn test_payment_after_term_expires_policy_and_notifies() {
        let h = Harness::on(date(2025, 1, 15));
        let customer = h.customer().await.unwrap();
        let offer = h.plan().await.unwrap();
        let policy = h
            .engine
            .create_policy(PolicyApplication {
                term_years: 5,
                payment_interval: PaymentInterval::Yearly,
                ..application(&customer, offer.plan.id)
            })
            .await
            .unwrap();

        h.clock.set_date(date(2030, 1, 16));
        let receipt = pay(&h, policy.id()).await.unwrap();

        assert!(receipt.expired);
        assert_eq!(receipt.policy.policy.status, PolicyStatus::Expired);

        let sent = h.notifier.sent().await;
        assert!(matches!(
            sent.as_slice(),
            [Notification::PolicyMatured { maturity_payout, .. }] if maturity_payout.amount() == dec!(120000)
        ));

        let err = h.engine.quote_installment(policy.id()).await.unwrap_err();
        assert!(matches!(err, LifecycleError::AlreadyInTerminalState(_)));
    }

    #[tokio::test]
    async fn test_elapsed_policy_reads_as_expired() {
        let h = Harness::on(date(2025, 1, 15));
        let (_, policy) = issued(&h).await;

        h.clock.set_date(date(2035, 1, 16));
        let view = h.engine.policy_by_id(policy.id()).await.unwrap();

        assert_eq!(view.policy.status, PolicyStatus::Active);
        assert_eq!(view.effective_status, PolicyStatus::Expired);
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_undo_expiry() {
        let h = Harness::with_notifier(date(2025, 1, 15), MockNotifier::failing());
        let customer = h.customer().await.unwrap();
        let offer = h.plan().await.unwrap();
        let policy = h
            .engine
            .create_policy(PolicyApplication {
                term_years: 5,
                payment_interval: PaymentInterval::Yearly,
                ..application(&customer, offer.plan.id)
            })
            .await
            .unwrap();

        h.clock.set_date(date(2030, 2, 1));
        let receipt = pay(&h, policy.id()).await.unwrap();

        assert!(receipt.expired);
        let view = h.engine.policy_by_id(policy.id()).await.unwrap();
        assert_eq!(view.policy.status, PolicyStatus::Expired);
    }

    #[tokio::test]
    async fn test_unknown_policy_is_not_found() {
        let h = Harness::on(date(2025, 1, 15));
        let err = h.engine.quote_installment(PolicyId::new()).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { .. }));
        let err = h.engine.transactions_for_policy(PolicyId::new()).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { .. }));
    }
}

// ============================================================================
// Claims
// ============================================================================

mod claim_tests {
    use super::*;

    fn submission(policy_id: PolicyId) -> ClaimSubmission {
        ClaimSubmission {
            policy_id,
            explanation: "Hospitalised after an accident".to_string(),
            document_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_submitted_claim_is_pending_and_leaves_policy_alone() {
        let h = Harness::on(date(2025, 1, 15));
        let (customer, policy) = issued(&h).await;

        let claim = h
            .engine
            .submit_claim(customer.id, submission(policy.id()))
            .await
            .unwrap();

        assert_eq!(claim.status, ClaimStatus::Pending);
        assert_eq!(h.engine.pending_claims().await.unwrap().len(), 1);
        assert_eq!(h.engine.claims_for_customer(customer.id).await.unwrap().len(), 1);
        let view = h.engine.policy_by_id(policy.id()).await.unwrap();
        assert_eq!(view.policy.status, PolicyStatus::Active);
    }

    #[tokio::test]
    async fn test_only_the_owner_may_claim() {
        let h = Harness::on(date(2025, 1, 15));
        let (_, policy) = issued(&h).await;
        let stranger = h.customer().await.unwrap();

        let err = h
            .engine
            .submit_claim(stranger.id, submission(policy.id()))
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_missing_document_or_policy_is_not_found() {
        let h = Harness::on(date(2025, 1, 15));
        let (customer, policy) = issued(&h).await;

        let mut with_document = submission(policy.id());
        with_document.document_ids.push(DocumentId::new());
        let err = h
            .engine
            .submit_claim(customer.id, with_document)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { ref entity_type, .. } if entity_type == "Document"));

        let err = h
            .engine
            .submit_claim(customer.id, submission(PolicyId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { .. }));
        assert!(h.engine.pending_claims().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_explanation_is_invalid() {
        let h = Harness::on(date(2025, 1, 15));
        let (customer, policy) = issued(&h).await;

        let mut blank = submission(policy.id());
        blank.explanation = "   ".to_string();
        let err = h.engine.submit_claim(customer.id, blank).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
    }

    #[tokio::test]
    async fn test_approval_claims_the_policy_once() {
        let h = Harness::on(date(2025, 1, 15));
        h.rates(dec!(0), dec!(10), dec!(0), dec!(0)).await.unwrap();
        let (customer, policy) = issued(&h).await;
        let admin = h.admin().await.unwrap();
        let claim = h
            .engine
            .submit_claim(customer.id, submission(policy.id()))
            .await
            .unwrap();

        let resolution = h.engine.approve_claim(claim.id, admin.id).await.unwrap();

        assert!(matches!(resolution.claim.status, ClaimStatus::Approved { resolved_by, .. } if resolved_by == admin.id));
        assert_eq!(resolution.payout.map(|p| p.amount()), Some(dec!(90000)));
        let view = h.engine.policy_by_id(policy.id()).await.unwrap();
        assert_eq!(view.policy.status, PolicyStatus::Claimed);
        assert!(matches!(
            h.notifier.sent().await.as_slice(),
            [Notification::ClaimApproved { .. }]
        ));

        let err = h.engine.approve_claim(claim.id, admin.id).await.unwrap_err();
        assert!(matches!(err, LifecycleError::AlreadyInTerminalState(_)));
        let view = h.engine.policy_by_id(policy.id()).await.unwrap();
        assert_eq!(view.policy.status, PolicyStatus::Claimed);
        assert_eq!(view.policy.version, policy.version() + 1);
    }

    #[tokio::test]
    async fn test_settings_outage_leaves_claim_pending() {
        let h = Harness::on(date(2025, 1, 15));
        h.rates(dec!(0), dec!(10), dec!(0), dec!(0)).await.unwrap();
        let (customer, policy) = issued(&h).await;
        let admin = h.admin().await.unwrap();
        let claim = h
            .engine
            .submit_claim(customer.id, submission(policy.id()))
            .await
            .unwrap();

        h.settings.set_unavailable(true);
        let err = h.engine.approve_claim(claim.id, admin.id).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Port(_)));

        let stored = h.store.get_claim(claim.id).await.unwrap();
        assert_eq!(stored.status, ClaimStatus::Pending);
        let stored = h.store.get_policy(policy.id()).await.unwrap();
        assert_eq!(stored.status(), PolicyStatus::Active);
        assert!(h.notifier.sent().await.is_empty());

        h.settings.set_unavailable(false);
        let resolution = h.engine.approve_claim(claim.id, admin.id).await.unwrap();
        assert_eq!(resolution.payout.map(|p| p.amount()), Some(dec!(90000)));
    }

    #[tokio::test]
    async fn test_rejection_keeps_policy_active() {
        let h = Harness::on(date(2025, 1, 15));
        let (customer, policy) = issued(&h).await;
        let admin = h.admin().await.unwrap();
        let claim = h
            .engine
            .submit_claim(customer.id, submission(policy.id()))
            .await
            .unwrap();

        let resolution = h.engine.reject_claim(claim.id, admin.id).await.unwrap();

        assert_eq!(resolution.claim.status.as_str(), "REJECTED");
        assert_eq!(resolution.payout, None);
        let view = h.engine.policy_by_id(policy.id()).await.unwrap();
        assert_eq!(view.policy.status, PolicyStatus::Active);

        let err = h.engine.approve_claim(claim.id, admin.id).await.unwrap_err();
        assert!(matches!(err, LifecycleError::AlreadyInTerminalState(_)));
    }

    #[tokio::test]
    async fn test_non_admin_cannot_resolve() {
        let h = Harness::on(date(2025, 1, 15));
        let (customer, policy) = issued(&h).await;
        let claim = h
            .engine
            .submit_claim(customer.id, submission(policy.id()))
            .await
            .unwrap();

        let err = h.engine.approve_claim(claim.id, AdminId::new()).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_claim_on_cancelled_policy_stays_pending() {
        let h = Harness::on(date(2025, 1, 15));
        let (customer, policy) = issued(&h).await;
        let admin = h.admin().await.unwrap();
        let claim = h
            .engine
            .submit_claim(customer.id, submission(policy.id()))
            .await
            .unwrap();
        let request = h
            .engine
            .request_withdrawal(customer.id, policy.id())
            .await
            .unwrap();
        h.engine.approve_withdrawal(request.id, admin.id).await.unwrap();

        let err = h.engine.approve_claim(claim.id, admin.id).await.unwrap_err();

        assert!(matches!(err, LifecycleError::AlreadyInTerminalState(_)));
        let stored = h.store.get_claim(claim.id).await.unwrap();
        assert_eq!(stored.status, ClaimStatus::Pending);
    }

    #[tokio::test]
    async fn test_notification_failure_is_swallowed() {
        let h = Harness::with_notifier(date(2025, 1, 15), MockNotifier::failing());
        let (customer, policy) = issued(&h).await;
        let admin = h.admin().await.unwrap();
        let claim = h
            .engine
            .submit_claim(customer.id, submission(policy.id()))
            .await
            .unwrap();

        assert!(h.engine.approve_claim(claim.id, admin.id).await.is_ok());
        let view = h.engine.policy_by_id(policy.id()).await.unwrap();
        assert_eq!(view.policy.status, PolicyStatus::Claimed);
    }
}

// ============================================================================
// Withdrawals
// ============================================================================

mod withdrawal_tests {
    use super::*;

    #[tokio::test]
    async fn test_approval_cancels_policy_once() {
        let h = Harness::on(date(2025, 1, 15));
        h.rates(dec!(0), dec!(0), dec!(10), dec!(0)).await.unwrap();
        let (customer, policy) = issued(&h).await;
        let admin = h.admin().await.unwrap();
        pay(&h, policy.id()).await.unwrap();

        let request = h
            .engine
            .request_withdrawal(customer.id, policy.id())
            .await
            .unwrap();
        assert_eq!(request.status, WithdrawalStatus::Pending);

        let resolution = h.engine.approve_withdrawal(request.id, admin.id).await.unwrap();

        assert_eq!(resolution.request.status, WithdrawalStatus::Approved);
        assert_eq!(resolution.request.resolved_by, Some(admin.id));
        assert_eq!(resolution.payout.map(|p| p.amount()), Some(dec!(2250)));
        let view = h.engine.policy_by_id(policy.id()).await.unwrap();
        assert_eq!(view.policy.status, PolicyStatus::Cancelled);

        let err = h
            .engine
            .approve_withdrawal(request.id, admin.id)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::AlreadyInTerminalState(_)));
        assert!(h.engine.pending_withdrawals().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_settings_outage_leaves_withdrawal_pending() {
        let h = Harness::on(date(2025, 1, 15));
        h.rates(dec!(0), dec!(0), dec!(10), dec!(0)).await.unwrap();
        let (customer, policy) = issued(&h).await;
        let admin = h.admin().await.unwrap();
        let request = h
            .engine
            .request_withdrawal(customer.id, policy.id())
            .await
            .unwrap();

        h.settings.set_unavailable(true);
        let err = h
            .engine
            .approve_withdrawal(request.id, admin.id)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Port(_)));

        let stored = h.store.get_withdrawal(request.id).await.unwrap();
        assert_eq!(stored.status, WithdrawalStatus::Pending);
        let stored = h.store.get_policy(policy.id()).await.unwrap();
        assert_eq!(stored.status(), PolicyStatus::Active);

        h.settings.set_unavailable(false);
        let resolution = h.engine.approve_withdrawal(request.id, admin.id).await.unwrap();
        assert_eq!(resolution.request.status, WithdrawalStatus::Approved);
    }

    #[tokio::test]
    async fn test_request_guards() {
        let h = Harness::on(date(2025, 1, 15));
        let (customer, policy) = issued(&h).await;
        let stranger = h.customer().await.unwrap();

        let err = h
            .engine
            .request_withdrawal(stranger.id, policy.id())
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Unauthorized(_)));

        let err = h
            .engine
            .request_withdrawal(customer.id, PolicyId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { .. }));

        let mut inactive = customer.clone();
        inactive.active = false;
        h.parties.save_customer(inactive).await.unwrap();
        let err = h
            .engine
            .request_withdrawal(customer.id, policy.id())
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_rejection_keeps_policy_active() {
        let h = Harness::on(date(2025, 1, 15));
        let (customer, policy) = issued(&h).await;
        let admin = h.admin().await.unwrap();
        let request = h
            .engine
            .request_withdrawal(customer.id, policy.id())
            .await
            .unwrap();
        assert_eq!(h.engine.pending_withdrawals().await.unwrap().len(), 1);

        let resolution = h.engine.reject_withdrawal(request.id, admin.id).await.unwrap();

        assert_eq!(resolution.request.status, WithdrawalStatus::Rejected);
        assert_eq!(resolution.payout, None);
        let view = h.engine.policy_by_id(policy.id()).await.unwrap();
        assert_eq!(view.policy.status, PolicyStatus::Active);
        assert!(matches!(
            h.notifier.sent().await.as_slice(),
            [Notification::WithdrawalRejected { .. }]
        ));
    }

    #[tokio::test]
    async fn test_inactive_admin_cannot_approve() {
        let h = Harness::on(date(2025, 1, 15));
        let (customer, policy) = issued(&h).await;
        let mut admin = h.admin().await.unwrap();
        admin.active = false;
        let admin = h.parties.save_admin(admin).await.unwrap();
        let request = h
            .engine
            .request_withdrawal(customer.id, policy.id())
            .await
            .unwrap();

        let err = h
            .engine
            .approve_withdrawal(request.id, admin.id)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Unauthorized(_)));
    }
}

// ============================================================================
// Commissions
// ============================================================================

mod commission_tests {
    use super::*;

    #[tokio::test]
    async fn test_summary_sums_scheme_percentages() {
        let h = Harness::on(date(2025, 1, 15));
        let agent = h.agent().await.unwrap();
        let admin = h.admin().await.unwrap();
        let offer = h.plan_under(dec!(5), dec!(10)).await.unwrap();
        let customer = h.customer().await.unwrap();

        let mut sold = Vec::new();
        for _ in 0..2 {
            let policy = h
                .engine
                .create_policy(PolicyApplication {
                    agent_id: Some(agent.id),
                    ..application(&customer, offer.plan.id)
                })
                .await
                .unwrap();
            sold.push(policy);
        }
        h.engine
            .create_policy(application(&customer, offer.plan.id))
            .await
            .unwrap();

        let request = h
            .engine
            .request_withdrawal(customer.id, sold[0].id())
            .await
            .unwrap();
        h.engine.approve_withdrawal(request.id, admin.id).await.unwrap();

        let summary = h.engine.agent_commission_summary(agent.id).await.unwrap();
        assert_eq!(summary.total_commission, dec!(10));
        assert_eq!(summary.total_withdrawal_exposure, dec!(20));
        assert_eq!(summary.sold_policy_count, 2);
        assert_eq!(summary.cancelled_policy_count, 1);

        let lines = h.engine.agent_commissions(agent.id).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.commission == 5));
        assert_eq!(h.engine.withdrawals_for_agent(agent.id).await.unwrap().len(), 1);
        assert_eq!(h.engine.policies_by_agent(agent.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_agent_is_not_found() {
        let h = Harness::on(date(2025, 1, 15));
        let err = h
            .engine
            .agent_commission_summary(AgentId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { .. }));
    }
}

// ============================================================================
// Settings
// ============================================================================

mod settings_tests {
    use super::*;
    use domain_billing::{NewInsuranceSetting, NewTaxSetting};

    #[tokio::test]
    async fn test_latest_snapshot_wins() {
        let h = Harness::on(date(2025, 1, 15));
        let current = h.engine.current_settings().await.unwrap();
        assert!(current.tax.is_none());
        assert!(current.insurance.is_none());

        h.engine
            .publish_tax_setting(NewTaxSetting { tax_percentage: dec!(5) })
            .await
            .unwrap();
        h.engine
            .publish_tax_setting(NewTaxSetting { tax_percentage: dec!(18) })
            .await
            .unwrap();

        let current = h.engine.current_settings().await.unwrap();
        assert_eq!(current.tax.map(|t| t.tax_percentage), Some(dec!(18)));
    }

    #[tokio::test]
    async fn test_out_of_range_percentages_are_rejected() {
        let h = Harness::on(date(2025, 1, 15));
        let err = h
            .engine
            .publish_insurance_setting(NewInsuranceSetting {
                claim_deduction: dec!(101),
                withdrawal_penalty: dec!(10),
                late_penalty: dec!(2),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
        assert!(h.engine.current_settings().await.unwrap().insurance.is_none());
    }
}

// ============================================================================
// Store
// ============================================================================

mod store_tests {
    use super::*;
    use domain_billing::Transaction;

    #[tokio::test]
    async fn test_stale_version_writes_nothing() {
        let h = Harness::on(date(2025, 1, 15));
        let (_, policy) = issued(&h).await;

        let mut first = h.store.get_policy(policy.id()).await.unwrap();
        let mut second = first.clone();
        let loaded_at = first.version();

        first.record_installment(date(2025, 1, 15)).unwrap();
        let tx = Transaction::successful(first.id(), Money::from_units(2500), "ch_1", chrono::Utc::now());
        h.store
            .record_payment(&tx, PolicyUpdate::new(&first, loaded_at))
            .await
            .unwrap();

        second.cancel().unwrap();
        let stale = Transaction::successful(second.id(), Money::from_units(2500), "ch_2", chrono::Utc::now());
        let err = h
            .store
            .record_payment(&stale, PolicyUpdate::new(&second, loaded_at))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        let stored = h.store.get_policy(policy.id()).await.unwrap();
        assert_eq!(stored.status(), PolicyStatus::Active);
        assert_eq!(h.store.transactions_for_policy(policy.id()).await.unwrap().len(), 1);
    }
}

// ============================================================================
// Properties
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn paid_total_tracks_installments(payments in 1usize..12) {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            runtime.block_on(async {
                let h = Harness::on(date(2025, 1, 15));
                let (_, policy) = issued(&h).await;

                let mut due_on = policy.next_payment_date();
                for _ in 0..payments {
                    h.clock.set_date(due_on);
                    let receipt = pay(&h, policy.id()).await.unwrap();
                    prop_assert!(receipt.policy.policy.next_payment_date > due_on);
                    due_on = receipt.policy.policy.next_payment_date;
                }

                let view = h.engine.policy_by_id(policy.id()).await.unwrap();
                prop_assert_eq!(
                    view.policy.total_amount_paid,
                    Money::from_units(2500 * payments as i64)
                );
                prop_assert_eq!(
                    h.engine.transactions_for_policy(policy.id()).await.unwrap().len(),
                    payments
                );
                Ok(())
            })?;
        }
    }
}
