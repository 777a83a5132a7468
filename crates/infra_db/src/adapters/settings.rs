//! PostgreSQL Settings Adapter
//!
//! Settings are snapshots: publishing appends a row and the newest row is
//! the current one.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_billing::{
    InsuranceSetting, NewInsuranceSetting, NewTaxSetting, SettingsPort, TaxSetting,
};

use crate::repositories::BillingRepository;

#[derive(Debug, Clone)]
pub struct PostgresSettingsAdapter {
    repository: BillingRepository,
    pool: PgPool,
}

impl PostgresSettingsAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: BillingRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresSettingsAdapter {}

#[async_trait]
impl HealthCheckable for PostgresSettingsAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-settings-adapter").await
    }
}

#[async_trait]
impl SettingsPort for PostgresSettingsAdapter {
    #[instrument(skip(self))]
    async fn current_tax_setting(&self) -> Result<Option<TaxSetting>, PortError> {
        Ok(self.repository.latest_tax_setting().await?.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn current_insurance_setting(&self) -> Result<Option<InsuranceSetting>, PortError> {
        Ok(self.repository.latest_insurance_setting().await?.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn publish_tax_setting(&self, setting: NewTaxSetting) -> Result<TaxSetting, PortError> {
        let row = self.repository.insert_tax_setting(&setting).await?;
        info!(setting_id = row.id, "Tax setting published");
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn publish_insurance_setting(
        &self,
        setting: NewInsuranceSetting,
    ) -> Result<InsuranceSetting, PortError> {
        let row = self.repository.insert_insurance_setting(&setting).await?;
        info!(setting_id = row.id, "Insurance setting published");
        Ok(row.into())
    }
}
