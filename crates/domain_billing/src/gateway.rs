//! Payment gateway port
//!
//! The engine never starts or retries a charge. The gateway tells us, via
//! its capture webhook, that a charge succeeded; a client later presents the
//! charge id as proof of payment and the engine looks the capture up here.
//! A client-supplied amount is never trusted on its own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, HealthCheckable, Money, PolicyId, PortError};

/// Proof of payment presented by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeConfirmation {
    pub charge_id: String,
}

/// A charge as reported by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedCharge {
    pub charge_id: String,
    pub policy_id: PolicyId,
    pub amount: Money,
    pub succeeded: bool,
    pub captured_at: DateTime<Utc>,
}

/// Access to gateway captures
#[async_trait]
pub trait PaymentGateway: DomainPort + HealthCheckable {
    /// Looks up the capture behind a confirmation
    ///
    /// Fails with `PortError::NotFound` for an unknown charge id.
    async fn verify_capture(
        &self,
        confirmation: &ChargeConfirmation,
    ) -> Result<CapturedCharge, PortError>;

    /// Records a capture reported by the gateway webhook
    ///
    /// Re-reporting the same charge id with different details is a conflict.
    async fn record_capture(&self, capture: CapturedCharge) -> Result<CapturedCharge, PortError>;
}

/// Mock implementation of PaymentGateway for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    /// In-memory capture registry
    #[derive(Debug, Default, Clone)]
    pub struct MockPaymentGateway {
        captures: Arc<RwLock<HashMap<String, CapturedCharge>>>,
    }

    impl MockPaymentGateway {
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers a successful capture and returns the confirmation a
        /// client would present for it
        pub async fn capture(&self, policy_id: PolicyId, amount: Money) -> ChargeConfirmation {
            let charge_id = format!("ch_{}", uuid::Uuid::new_v4().simple());
            self.captures.write().await.insert(
                charge_id.clone(),
                CapturedCharge {
                    charge_id: charge_id.clone(),
                    policy_id,
                    amount,
                    succeeded: true,
                    captured_at: Utc::now(),
                },
            );
            ChargeConfirmation { charge_id }
        }
    }

    impl DomainPort for MockPaymentGateway {}

    #[async_trait]
    impl HealthCheckable for MockPaymentGateway {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-payment-gateway")
        }
    }

    #[async_trait]
    impl PaymentGateway for MockPaymentGateway {
        async fn verify_capture(
            &self,
            confirmation: &ChargeConfirmation,
        ) -> Result<CapturedCharge, PortError> {
            self.captures
                .read()
                .await
                .get(&confirmation.charge_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Charge", &confirmation.charge_id))
        }

        async fn record_capture(&self, capture: CapturedCharge) -> Result<CapturedCharge, PortError> {
            let mut captures = self.captures.write().await;
            if let Some(existing) = captures.get(&capture.charge_id) {
                if existing.policy_id != capture.policy_id || existing.amount != capture.amount {
                    return Err(PortError::conflict(format!(
                        "charge {} already recorded with different details",
                        capture.charge_id
                    )));
                }
                return Ok(existing.clone());
            }
            captures.insert(capture.charge_id.clone(), capture.clone());
            Ok(capture)
        }
    }
}
