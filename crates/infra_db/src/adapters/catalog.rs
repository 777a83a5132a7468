//! PostgreSQL Catalog Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{
    DomainPort, HealthCheckResult, HealthCheckable, PlanId, PortError, SchemeId,
};
use domain_policy::{CatalogPort, InsurancePlan, InsuranceScheme};

use crate::repositories::CatalogRepository;

/// PostgreSQL-backed implementation of the CatalogPort trait
///
/// Saving a plan whose scheme does not exist violates the foreign key and
/// is reported as a validation error.
#[derive(Debug, Clone)]
pub struct PostgresCatalogAdapter {
    repository: CatalogRepository,
    pool: PgPool,
}

impl PostgresCatalogAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CatalogRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresCatalogAdapter {}

#[async_trait]
impl HealthCheckable for PostgresCatalogAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-catalog-adapter").await
    }
}

#[async_trait]
impl CatalogPort for PostgresCatalogAdapter {
    #[instrument(skip_all, fields(plan_id = %id))]
    async fn get_plan(&self, id: PlanId) -> Result<InsurancePlan, PortError> {
        let row = self.repository.get_plan(id.into()).await?;
        Ok(InsurancePlan::try_from(row)?)
    }

    #[instrument(skip_all, fields(scheme_id = %id))]
    async fn get_scheme(&self, id: SchemeId) -> Result<InsuranceScheme, PortError> {
        let row = self.repository.get_scheme(id.into()).await?;
        Ok(row.into())
    }

    #[instrument(skip_all, fields(scheme_id = %scheme.id))]
    async fn save_scheme(&self, scheme: InsuranceScheme) -> Result<InsuranceScheme, PortError> {
        let row = self.repository.upsert_scheme(&scheme).await?;
        Ok(row.into())
    }

    #[instrument(skip_all, fields(plan_id = %plan.id, scheme_id = %plan.scheme_id))]
    async fn save_plan(&self, plan: InsurancePlan) -> Result<InsurancePlan, PortError> {
        let row = self.repository.upsert_plan(&plan).await?;
        Ok(InsurancePlan::try_from(row)?)
    }
}
