//! PostgreSQL Party Adapter
//!
//! Implements `PartyPort` on top of `PartyRepository`. Saves are upserts; a
//! second customer with an existing email surfaces as `PortError::Conflict`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdminId, AgentId, CustomerId, DomainPort, EmployeeId, HealthCheckResult, HealthCheckable,
    PortError,
};
use domain_party::{Admin, Agent, Customer, Employee, PartyPort, VerificationStatus};

use crate::repositories::PartyRepository;

/// PostgreSQL-backed implementation of the PartyPort trait
#[derive(Debug, Clone)]
pub struct PostgresPartyAdapter {
    repository: PartyRepository,
    pool: PgPool,
}

impl PostgresPartyAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PartyRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresPartyAdapter {}

#[async_trait]
impl HealthCheckable for PostgresPartyAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-party-adapter").await
    }
}

#[async_trait]
impl PartyPort for PostgresPartyAdapter {
    #[instrument(skip_all, fields(customer_id = %id))]
    async fn get_customer(&self, id: CustomerId) -> Result<Customer, PortError> {
        debug!("Fetching customer");
        let row = self.repository.get_customer(id.into()).await?;
        Ok(Customer::try_from(row)?)
    }

    #[instrument(skip_all, fields(agent_id = %id))]
    async fn get_agent(&self, id: AgentId) -> Result<Agent, PortError> {
        let row = self.repository.get_agent(id.into()).await?;
        Ok(row.into())
    }

    #[instrument(skip_all, fields(admin_id = %id))]
    async fn get_admin(&self, id: AdminId) -> Result<Admin, PortError> {
        let row = self.repository.get_admin(id.into()).await?;
        Ok(row.into())
    }

    #[instrument(skip_all, fields(employee_id = %id))]
    async fn get_employee(&self, id: EmployeeId) -> Result<Employee, PortError> {
        let row = self.repository.get_employee(id.into()).await?;
        Ok(row.into())
    }

    #[instrument(skip_all, fields(customer_id = %customer.id))]
    async fn save_customer(&self, customer: Customer) -> Result<Customer, PortError> {
        let row = self.repository.upsert_customer(&customer).await?;
        debug!("Customer saved");
        Ok(Customer::try_from(row)?)
    }

    #[instrument(skip_all, fields(agent_id = %agent.id))]
    async fn save_agent(&self, agent: Agent) -> Result<Agent, PortError> {
        let row = self.repository.upsert_agent(&agent).await?;
        Ok(row.into())
    }

    #[instrument(skip_all, fields(admin_id = %admin.id))]
    async fn save_admin(&self, admin: Admin) -> Result<Admin, PortError> {
        let row = self.repository.upsert_admin(&admin).await?;
        Ok(row.into())
    }

    #[instrument(skip_all, fields(customer_id = %id, status = %status))]
    async fn update_verification_status(
        &self,
        id: CustomerId,
        status: VerificationStatus,
    ) -> Result<Customer, PortError> {
        let row = self.repository.update_verification_status(id.into(), status).await?;
        Ok(Customer::try_from(row)?)
    }
}
