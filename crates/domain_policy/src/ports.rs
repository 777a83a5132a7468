//! Policy Domain Ports
//!
//! Catalog data (schemes and plans) is maintained by back-office screens
//! outside the engine. The engine reads it through [`CatalogPort`].

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PlanId, PortError, SchemeId};

use crate::catalog::{InsurancePlan, InsuranceScheme, PlanWithScheme};

/// Read access to catalog reference data
#[async_trait]
pub trait CatalogPort: DomainPort + HealthCheckable {
    /// Retrieves a plan by ID
    async fn get_plan(&self, id: PlanId) -> Result<InsurancePlan, PortError>;

    /// Retrieves a scheme by ID
    async fn get_scheme(&self, id: SchemeId) -> Result<InsuranceScheme, PortError>;

    /// Retrieves a plan with its parent scheme
    async fn get_plan_with_scheme(&self, id: PlanId) -> Result<PlanWithScheme, PortError> {
        let plan = self.get_plan(id).await?;
        let scheme = self.get_scheme(plan.scheme_id).await?;
        Ok(PlanWithScheme { plan, scheme })
    }

    /// Inserts or replaces a scheme
    async fn save_scheme(&self, scheme: InsuranceScheme) -> Result<InsuranceScheme, PortError>;

    /// Inserts or replaces a plan
    async fn save_plan(&self, plan: InsurancePlan) -> Result<InsurancePlan, PortError>;
}

/// Mock implementation of CatalogPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    /// In-memory mock implementation of CatalogPort
    #[derive(Debug, Default, Clone)]
    pub struct MockCatalogPort {
        schemes: Arc<RwLock<HashMap<SchemeId, InsuranceScheme>>>,
        plans: Arc<RwLock<HashMap<PlanId, InsurancePlan>>>,
    }

    impl MockCatalogPort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for MockCatalogPort {}

    #[async_trait]
    impl HealthCheckable for MockCatalogPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-catalog-port")
        }
    }

    #[async_trait]
    impl CatalogPort for MockCatalogPort {
        async fn get_plan(&self, id: PlanId) -> Result<InsurancePlan, PortError> {
            self.plans
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("InsurancePlan", id))
        }

        async fn get_scheme(&self, id: SchemeId) -> Result<InsuranceScheme, PortError> {
            self.schemes
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("InsuranceScheme", id))
        }

        async fn save_scheme(&self, scheme: InsuranceScheme) -> Result<InsuranceScheme, PortError> {
            self.schemes.write().await.insert(scheme.id, scheme.clone());
            Ok(scheme)
        }

        async fn save_plan(&self, plan: InsurancePlan) -> Result<InsurancePlan, PortError> {
            if !self.schemes.read().await.contains_key(&plan.scheme_id) {
                return Err(PortError::validation_field(
                    format!("scheme {} does not exist", plan.scheme_id),
                    "scheme_id",
                ));
            }
            self.plans.write().await.insert(plan.id, plan.clone());
            Ok(plan)
        }
    }
}
