//! Tests for domain_withdrawal

use chrono::Utc;
use rust_decimal_macros::dec;

use core_kernel::{AdminId, CustomerId, Money, PolicyId, Rate, WithdrawalId};
use domain_withdrawal::{
    withdrawal_payout, NewWithdrawalRequest, WithdrawalError, WithdrawalRequest, WithdrawalStatus,
};

fn pending() -> WithdrawalRequest {
    WithdrawalRequest::from_new(
        WithdrawalId::new(3),
        NewWithdrawalRequest {
            policy_id: PolicyId::new(),
            customer_id: CustomerId::new(),
            requested_at: Utc::now(),
        },
    )
}

// ============================================================================
// Resolution Tests
// ============================================================================

mod resolution_tests {
    use super::*;

    #[test]
    fn test_approval_records_admin() {
        let mut request = pending();
        let admin = AdminId::new();
        request.approve(admin, Utc::now()).unwrap();

        assert_eq!(request.status, WithdrawalStatus::Approved);
        assert_eq!(request.resolved_by, Some(admin));
        assert!(request.resolved_at.is_some());
    }

    #[test]
    fn test_second_approval_fails() {
        let mut request = pending();
        let first = AdminId::new();
        request.approve(first, Utc::now()).unwrap();

        let err = request.approve(AdminId::new(), Utc::now()).unwrap_err();
        assert!(matches!(err, WithdrawalError::AlreadyInTerminalState { .. }));
        assert_eq!(request.resolved_by, Some(first));
    }

    #[test]
    fn test_rejected_request_cannot_be_approved() {
        let mut request = pending();
        request.reject(AdminId::new(), Utc::now()).unwrap();
        assert!(request.approve(AdminId::new(), Utc::now()).is_err());
        assert_eq!(request.status, WithdrawalStatus::Rejected);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("APPROVED".parse::<WithdrawalStatus>().unwrap(), WithdrawalStatus::Approved);
        assert!("approved".parse::<WithdrawalStatus>().is_err());
    }
}

// ============================================================================
// Payout Tests
// ============================================================================

mod payout_tests {
    use super::*;

    #[test]
    fn test_penalty_applied_to_amount_paid() {
        let payout = withdrawal_payout(Money::from_units(7500), Rate::from_percentage(dec!(20)));
        assert_eq!(payout.amount(), dec!(6000));
    }

    #[test]
    fn test_nothing_paid_nothing_refunded() {
        let payout = withdrawal_payout(Money::zero(), Rate::from_percentage(dec!(20)));
        assert!(payout.is_zero());
    }
}
