//! PostgreSQL capture registry
//!
//! The gateway webhook writes captures here; payment confirmation reads
//! them back by charge id.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_billing::{CapturedCharge, ChargeConfirmation, PaymentGateway};

use crate::repositories::BillingRepository;

#[derive(Debug, Clone)]
pub struct PostgresPaymentGateway {
    repository: BillingRepository,
    pool: PgPool,
}

impl PostgresPaymentGateway {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: BillingRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresPaymentGateway {}

#[async_trait]
impl HealthCheckable for PostgresPaymentGateway {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-capture-registry").await
    }
}

#[async_trait]
impl PaymentGateway for PostgresPaymentGateway {
    #[instrument(skip_all, fields(charge_id = %confirmation.charge_id))]
    async fn verify_capture(
        &self,
        confirmation: &ChargeConfirmation,
    ) -> Result<CapturedCharge, PortError> {
        let row = self.repository.find_capture(&confirmation.charge_id).await?;
        Ok(row.into())
    }

    #[instrument(skip_all, fields(charge_id = %capture.charge_id, policy_id = %capture.policy_id))]
    async fn record_capture(&self, capture: CapturedCharge) -> Result<CapturedCharge, PortError> {
        let row = self.repository.insert_capture(&capture).await?;
        info!(succeeded = row.succeeded, "Capture recorded");
        Ok(row.into())
    }
}
