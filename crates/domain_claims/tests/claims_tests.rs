//! Tests for domain_claims

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{AdminId, ClaimId, CustomerId, DocumentId, PolicyId, Rate};
use domain_claims::{
    claim_payout, Claim, ClaimError, ClaimStatus, Document, DocumentPort, MockDocumentPort,
    NewClaim,
};

fn new_claim(explanation: &str) -> NewClaim {
    NewClaim {
        policy_id: PolicyId::new(),
        customer_id: CustomerId::new(),
        explanation: explanation.to_string(),
        document_ids: Vec::new(),
        submitted_at: Utc::now(),
    }
}

// ============================================================================
// Claim Tests
// ============================================================================

mod claim_tests {
    use super::*;

    #[test]
    fn test_new_claim_is_pending() {
        let claim = Claim::from_new(ClaimId::new(7), new_claim("Critical illness"));
        assert_eq!(claim.status, ClaimStatus::Pending);
        assert_eq!(claim.id.to_string(), "CLM-7");
    }

    #[test]
    fn test_blank_explanation_rejected() {
        assert!(matches!(new_claim("   ").validate(), Err(ClaimError::Validation(_))));
        assert!(new_claim(&"x".repeat(2001)).validate().is_err());
        assert!(new_claim("Accident").validate().is_ok());
    }

    #[test]
    fn test_reject_then_approve_fails() {
        let mut claim = Claim::from_new(ClaimId::new(1), new_claim("Accident"));
        claim.reject(AdminId::new(), Utc::now()).unwrap();

        let err = claim.approve(AdminId::new(), Utc::now()).unwrap_err();
        assert!(err.to_string().contains("REJECTED"));
    }

    #[test]
    fn test_status_serializes_with_tag() {
        let json = serde_json::to_value(ClaimStatus::Pending).unwrap();
        assert_eq!(json["status"], "PENDING");
    }
}

// ============================================================================
// Payout Tests
// ============================================================================

mod payout_tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_deduction_pays_full_investment() {
        assert_eq!(claim_payout(50_000, Rate::zero()).amount(), dec!(50000));
    }

    proptest! {
        #[test]
        fn payout_never_exceeds_investment(investment in 1i64..100_000_000, deduction in 0u32..=100) {
            let payout = claim_payout(investment, Rate::from_percentage(Decimal::from(deduction)));
            prop_assert!(payout.amount() <= Decimal::from(investment));
            prop_assert!(!payout.is_negative());
        }
    }
}

// ============================================================================
// Document Port Tests
// ============================================================================

mod document_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_document_reported() {
        let port = MockDocumentPort::new();
        let present = port
            .save_document(Document {
                id: DocumentId::new(),
                customer_id: CustomerId::new(),
                name: "discharge-summary.pdf".into(),
                uploaded_at: Utc::now(),
            })
            .await
            .unwrap();

        assert!(port.ensure_documents_exist(&[present.id]).await.is_ok());
        let err = port
            .ensure_documents_exist(&[present.id, DocumentId::new()])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
