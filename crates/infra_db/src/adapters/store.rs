//! PostgreSQL Lifecycle Store
//!
//! Every write that touches a policy runs in one database transaction: the
//! version-guarded policy update and the transaction, claim or withdrawal
//! row commit together or not at all.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AgentId, ClaimId, CustomerId, DomainPort, HealthCheckResult, HealthCheckable, PolicyId,
    PortError, WithdrawalId,
};
use domain_billing::Transaction;
use domain_claims::{Claim, NewClaim};
use domain_lifecycle::{LifecycleStore, PolicyUpdate};
use domain_policy::Policy;
use domain_withdrawal::{NewWithdrawalRequest, WithdrawalRequest};

use crate::error::DatabaseError;
use crate::repositories::{
    BillingRepository, ClaimsRepository, PolicyRepository, WithdrawalRepository,
};

#[derive(Debug, Clone)]
pub struct PostgresLifecycleStore {
    policies: PolicyRepository,
    billing: BillingRepository,
    claims: ClaimsRepository,
    withdrawals: WithdrawalRepository,
    pool: PgPool,
}

impl PostgresLifecycleStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            policies: PolicyRepository::new(pool.clone()),
            billing: BillingRepository::new(pool.clone()),
            claims: ClaimsRepository::new(pool.clone()),
            withdrawals: WithdrawalRepository::new(pool.clone()),
            pool,
        }
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, PortError>
where
    T: TryFrom<R, Error = DatabaseError>,
{
    rows.into_iter()
        .map(|row| T::try_from(row).map_err(PortError::from))
        .collect()
}

impl DomainPort for PostgresLifecycleStore {}

#[async_trait]
impl HealthCheckable for PostgresLifecycleStore {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-lifecycle-store").await
    }
}

#[async_trait]
impl LifecycleStore for PostgresLifecycleStore {
    #[instrument(skip_all, fields(policy_id = %policy.id()))]
    async fn insert_policy(&self, policy: &Policy) -> Result<(), PortError> {
        self.policies.insert(policy).await?;
        debug!("Policy stored");
        Ok(())
    }

    #[instrument(skip_all, fields(policy_id = %id))]
    async fn get_policy(&self, id: PolicyId) -> Result<Policy, PortError> {
        let row = self.policies.get_by_id(id.into()).await?;
        Ok(Policy::try_from(row)?)
    }

    #[instrument(skip_all, fields(customer_id = %customer_id))]
    async fn policies_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Policy>, PortError> {
        convert_all(self.policies.find_by_customer(customer_id.into()).await?)
    }

    #[instrument(skip_all, fields(agent_id = %agent_id))]
    async fn policies_by_agent(&self, agent_id: AgentId) -> Result<Vec<Policy>, PortError> {
        convert_all(self.policies.find_by_agent(agent_id.into()).await?)
    }

    #[instrument(skip_all, fields(policy_id = %update.policy.id(), charge_id = %transaction.charge_id))]
    async fn record_payment(
        &self,
        transaction: &Transaction,
        update: PolicyUpdate<'_>,
    ) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        PolicyRepository::update_guarded(&mut tx, update).await?;
        BillingRepository::insert_transaction(&mut tx, transaction).await?;
        tx.commit().await.map_err(DatabaseError::from)?;

        debug!("Payment committed");
        Ok(())
    }

    #[instrument(skip_all, fields(policy_id = %policy_id))]
    async fn transactions_for_policy(&self, policy_id: PolicyId) -> Result<Vec<Transaction>, PortError> {
        convert_all(self.billing.transactions_for_policy(policy_id.into()).await?)
    }

    #[instrument(skip_all, fields(policy_id = %claim.policy_id))]
    async fn insert_claim(&self, claim: NewClaim) -> Result<Claim, PortError> {
        let row = self.claims.insert(&claim).await?;
        Ok(Claim::try_from(row)?)
    }

    #[instrument(skip_all, fields(claim_id = %id))]
    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
        let row = self.claims.get_by_id(id.value()).await?;
        Ok(Claim::try_from(row)?)
    }

    #[instrument(skip_all, fields(claim_id = %claim.id, status = claim.status.as_str()))]
    async fn resolve_claim(
        &self,
        claim: &Claim,
        policy: Option<PolicyUpdate<'_>>,
    ) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        ClaimsRepository::resolve(&mut tx, claim).await?;
        if let Some(update) = policy {
            PolicyRepository::update_guarded(&mut tx, update).await?;
        }
        tx.commit().await.map_err(DatabaseError::from)?;

        debug!("Claim resolution committed");
        Ok(())
    }

    #[instrument(skip_all, fields(customer_id = %customer_id))]
    async fn claims_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Claim>, PortError> {
        convert_all(self.claims.find_by_customer(customer_id.into()).await?)
    }

    #[instrument(skip(self))]
    async fn pending_claims(&self) -> Result<Vec<Claim>, PortError> {
        convert_all(self.claims.find_pending().await?)
    }

    #[instrument(skip_all, fields(policy_id = %request.policy_id))]
    async fn insert_withdrawal(
        &self,
        request: NewWithdrawalRequest,
    ) -> Result<WithdrawalRequest, PortError> {
        let row = self.withdrawals.insert(&request).await?;
        Ok(WithdrawalRequest::try_from(row)?)
    }

    #[instrument(skip_all, fields(request_id = %id))]
    async fn get_withdrawal(&self, id: WithdrawalId) -> Result<WithdrawalRequest, PortError> {
        let row = self.withdrawals.get_by_id(id.value()).await?;
        Ok(WithdrawalRequest::try_from(row)?)
    }

    #[instrument(skip_all, fields(request_id = %request.id, status = %request.status))]
    async fn resolve_withdrawal(
        &self,
        request: &WithdrawalRequest,
        policy: Option<PolicyUpdate<'_>>,
    ) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        WithdrawalRepository::resolve(&mut tx, request).await?;
        if let Some(update) = policy {
            PolicyRepository::update_guarded(&mut tx, update).await?;
        }
        tx.commit().await.map_err(DatabaseError::from)?;

        debug!("Withdrawal resolution committed");
        Ok(())
    }

    #[instrument(skip_all, fields(agent_id = %agent_id))]
    async fn withdrawals_for_agent(&self, agent_id: AgentId) -> Result<Vec<WithdrawalRequest>, PortError> {
        convert_all(self.withdrawals.find_by_agent(agent_id.into()).await?)
    }

    #[instrument(skip(self))]
    async fn pending_withdrawals(&self) -> Result<Vec<WithdrawalRequest>, PortError> {
        convert_all(self.withdrawals.find_pending().await?)
    }

    #[instrument(skip_all, fields(agent_id = %agent_id))]
    async fn count_approved_withdrawals_for_agent(&self, agent_id: AgentId) -> Result<u64, PortError> {
        let count = self.withdrawals.count_approved_by_agent(agent_id.into()).await?;
        u64::try_from(count).map_err(|e| PortError::internal(e.to_string()))
    }
}
