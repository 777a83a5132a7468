//! Customer notifications
//!
//! Notifications are sent after a state change has been committed. Delivery
//! failures are logged and never roll back or fail the operation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::{ClaimId, DomainPort, HealthCheckResult, HealthCheckable, Money, PolicyId, PortError, WithdrawalId};

/// Addressee of a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

/// A message to a customer about their policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    PolicyMatured {
        recipient: Recipient,
        policy_id: PolicyId,
        maturity_payout: Money,
    },
    ClaimApproved {
        recipient: Recipient,
        claim_id: ClaimId,
        policy_id: PolicyId,
        payout: Money,
    },
    ClaimRejected {
        recipient: Recipient,
        claim_id: ClaimId,
        policy_id: PolicyId,
    },
    WithdrawalApproved {
        recipient: Recipient,
        request_id: WithdrawalId,
        policy_id: PolicyId,
        payout: Money,
    },
    WithdrawalRejected {
        recipient: Recipient,
        request_id: WithdrawalId,
        policy_id: PolicyId,
    },
}

impl Notification {
    pub fn recipient(&self) -> &Recipient {
        match self {
            Notification::PolicyMatured { recipient, .. }
            | Notification::ClaimApproved { recipient, .. }
            | Notification::ClaimRejected { recipient, .. }
            | Notification::WithdrawalApproved { recipient, .. }
            | Notification::WithdrawalRejected { recipient, .. } => recipient,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notification::PolicyMatured { .. } => "policy_matured",
            Notification::ClaimApproved { .. } => "claim_approved",
            Notification::ClaimRejected { .. } => "claim_rejected",
            Notification::WithdrawalApproved { .. } => "withdrawal_approved",
            Notification::WithdrawalRejected { .. } => "withdrawal_rejected",
        }
    }

    /// Subject line for the given sender
    pub fn subject(&self, company: &str) -> String {
        match self {
            Notification::PolicyMatured { policy_id, .. } => {
                format!("{company}: your policy {policy_id} has matured")
            }
            Notification::ClaimApproved { claim_id, .. } => {
                format!("{company}: claim {claim_id} approved")
            }
            Notification::ClaimRejected { claim_id, .. } => {
                format!("{company}: claim {claim_id} rejected")
            }
            Notification::WithdrawalApproved { request_id, .. } => {
                format!("{company}: withdrawal {request_id} approved")
            }
            Notification::WithdrawalRejected { request_id, .. } => {
                format!("{company}: withdrawal {request_id} rejected")
            }
        }
    }
}

/// Outbound delivery of customer notifications
#[async_trait]
pub trait NotificationPort: DomainPort + HealthCheckable {
    async fn send(&self, company: &str, notification: &Notification) -> Result<(), PortError>;
}

/// Writes notifications to the log instead of delivering them
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl DomainPort for LoggingNotifier {}

#[async_trait]
impl HealthCheckable for LoggingNotifier {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("logging-notifier")
    }
}

#[async_trait]
impl NotificationPort for LoggingNotifier {
    async fn send(&self, company: &str, notification: &Notification) -> Result<(), PortError> {
        let recipient = notification.recipient();
        info!(
            kind = notification.kind(),
            to = %recipient.email,
            subject = %notification.subject(company),
            "Notification dispatched"
        );
        Ok(())
    }
}

/// Mock implementation of NotificationPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Records sent notifications; can be switched to fail every send
    #[derive(Debug, Default, Clone)]
    pub struct MockNotifier {
        sent: Arc<RwLock<Vec<Notification>>>,
        failing: Arc<AtomicBool>,
    }

    impl MockNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        /// A notifier whose every delivery fails
        pub fn failing() -> Self {
            let notifier = Self::default();
            notifier.failing.store(true, Ordering::SeqCst);
            notifier
        }

        pub async fn sent(&self) -> Vec<Notification> {
            self.sent.read().await.clone()
        }
    }

    impl DomainPort for MockNotifier {}

    #[async_trait]
    impl HealthCheckable for MockNotifier {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-notifier")
        }
    }

    #[async_trait]
    impl NotificationPort for MockNotifier {
        async fn send(&self, _company: &str, notification: &Notification) -> Result<(), PortError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(PortError::ServiceUnavailable {
                    service: "mail".to_string(),
                });
            }
            self.sent.write().await.push(notification.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_names_company() {
        let notification = Notification::ClaimRejected {
            recipient: Recipient {
                name: "Asha Rao".to_string(),
                email: "asha@example.com".to_string(),
            },
            claim_id: ClaimId::new(3),
            policy_id: PolicyId::new(),
        };
        assert_eq!(
            notification.subject("SecureLife Insurance"),
            "SecureLife Insurance: claim CLM-3 rejected"
        );
        assert_eq!(notification.kind(), "claim_rejected");
    }

    #[tokio::test]
    async fn test_logging_notifier_never_fails() {
        let notification = Notification::PolicyMatured {
            recipient: Recipient {
                name: "Asha Rao".to_string(),
                email: "asha@example.com".to_string(),
            },
            policy_id: PolicyId::new(),
            maturity_payout: Money::from_units(120_000),
        };
        assert!(LoggingNotifier.send("SecureLife Insurance", &notification).await.is_ok());
    }
}
