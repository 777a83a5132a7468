//! Persistence port for lifecycle state
//!
//! Policies, transactions, claims and withdrawal requests change together,
//! so they live behind one port whose write methods are atomic. Policy
//! writes carry the version the engine loaded; a store that finds a
//! different version fails with [`PortError::Conflict`] and writes nothing.

use async_trait::async_trait;

use core_kernel::{
    AgentId, ClaimId, CustomerId, DomainPort, HealthCheckable, PolicyId, PortError, WithdrawalId,
};
use domain_billing::Transaction;
use domain_claims::{Claim, NewClaim};
use domain_policy::Policy;
use domain_withdrawal::{NewWithdrawalRequest, WithdrawalRequest};

/// A policy write guarded by the version it was loaded at
#[derive(Debug, Clone, Copy)]
pub struct PolicyUpdate<'a> {
    pub policy: &'a Policy,
    pub expected_version: u32,
}

impl<'a> PolicyUpdate<'a> {
    pub fn new(policy: &'a Policy, expected_version: u32) -> Self {
        Self {
            policy,
            expected_version,
        }
    }
}

/// Storage of lifecycle aggregates
#[async_trait]
pub trait LifecycleStore: DomainPort + HealthCheckable {
    /// Stores a newly issued policy
    async fn insert_policy(&self, policy: &Policy) -> Result<(), PortError>;

    /// Retrieves a policy by ID
    async fn get_policy(&self, id: PolicyId) -> Result<Policy, PortError>;

    async fn policies_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Policy>, PortError>;

    async fn policies_by_agent(&self, agent_id: AgentId) -> Result<Vec<Policy>, PortError>;

    /// Atomically stores a payment transaction and the credited policy
    ///
    /// Fails with `Conflict` when the policy version moved or when the
    /// transaction's charge id has already been recorded.
    async fn record_payment(
        &self,
        transaction: &Transaction,
        update: PolicyUpdate<'_>,
    ) -> Result<(), PortError>;

    /// Transactions of a policy, oldest first
    async fn transactions_for_policy(&self, policy_id: PolicyId) -> Result<Vec<Transaction>, PortError>;

    /// Stores a new claim and assigns its id
    async fn insert_claim(&self, claim: NewClaim) -> Result<Claim, PortError>;

    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError>;

    /// Atomically stores a resolved claim and, on approval, the claimed policy
    ///
    /// Fails with `Conflict` when the stored claim is no longer pending.
    async fn resolve_claim(
        &self,
        claim: &Claim,
        policy: Option<PolicyUpdate<'_>>,
    ) -> Result<(), PortError>;

    async fn claims_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Claim>, PortError>;

    async fn pending_claims(&self) -> Result<Vec<Claim>, PortError>;

    /// Stores a new withdrawal request and assigns its id
    async fn insert_withdrawal(
        &self,
        request: NewWithdrawalRequest,
    ) -> Result<WithdrawalRequest, PortError>;

    async fn get_withdrawal(&self, id: WithdrawalId) -> Result<WithdrawalRequest, PortError>;

    /// Atomically stores a resolved request and, on approval, the cancelled policy
    ///
    /// Fails with `Conflict` when the stored request is no longer pending.
    async fn resolve_withdrawal(
        &self,
        request: &WithdrawalRequest,
        policy: Option<PolicyUpdate<'_>>,
    ) -> Result<(), PortError>;

    /// Withdrawal requests on policies sold by an agent
    async fn withdrawals_for_agent(&self, agent_id: AgentId) -> Result<Vec<WithdrawalRequest>, PortError>;

    async fn pending_withdrawals(&self) -> Result<Vec<WithdrawalRequest>, PortError>;

    /// Number of approved withdrawals on policies sold by an agent
    async fn count_approved_withdrawals_for_agent(&self, agent_id: AgentId) -> Result<u64, PortError>;
}

/// In-memory implementation of LifecycleStore for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;
    use domain_withdrawal::WithdrawalStatus;

    #[derive(Debug, Default)]
    struct State {
        policies: HashMap<PolicyId, Policy>,
        transactions: Vec<Transaction>,
        claims: BTreeMap<ClaimId, Claim>,
        withdrawals: BTreeMap<WithdrawalId, WithdrawalRequest>,
    }

    impl State {
        fn check_version(&self, update: &PolicyUpdate<'_>) -> Result<(), PortError> {
            let id = update.policy.id();
            let stored = self
                .policies
                .get(&id)
                .ok_or_else(|| PortError::not_found("Policy", id))?;
            if stored.version() != update.expected_version {
                return Err(PortError::conflict(format!(
                    "policy {id} is at version {}, expected {}",
                    stored.version(),
                    update.expected_version
                )));
            }
            Ok(())
        }

        fn apply(&mut self, update: PolicyUpdate<'_>) {
            let mut policy = update.policy.clone();
            policy.take_events();
            self.policies.insert(policy.id(), policy);
        }

        fn agent_of(&self, policy_id: PolicyId) -> Option<AgentId> {
            self.policies.get(&policy_id).and_then(|p| p.agent_id())
        }
    }

    /// All lifecycle state behind a single lock, so writes are atomic
    #[derive(Debug, Default, Clone)]
    pub struct MockLifecycleStore {
        state: Arc<RwLock<State>>,
    }

    impl MockLifecycleStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for MockLifecycleStore {}

    #[async_trait]
    impl HealthCheckable for MockLifecycleStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-lifecycle-store")
        }
    }

    #[async_trait]
    impl LifecycleStore for MockLifecycleStore {
        async fn insert_policy(&self, policy: &Policy) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if state.policies.contains_key(&policy.id()) {
                return Err(PortError::conflict(format!("policy {} already exists", policy.id())));
            }
            let mut stored = policy.clone();
            stored.take_events();
            state.policies.insert(stored.id(), stored);
            Ok(())
        }

        async fn get_policy(&self, id: PolicyId) -> Result<Policy, PortError> {
            self.state
                .read()
                .await
                .policies
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Policy", id))
        }

        async fn policies_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Policy>, PortError> {
            let state = self.state.read().await;
            let mut policies: Vec<Policy> = state
                .policies
                .values()
                .filter(|p| p.customer_id() == customer_id)
                .cloned()
                .collect();
            policies.sort_by_key(|p| p.created_at());
            Ok(policies)
        }

        async fn policies_by_agent(&self, agent_id: AgentId) -> Result<Vec<Policy>, PortError> {
            let state = self.state.read().await;
            let mut policies: Vec<Policy> = state
                .policies
                .values()
                .filter(|p| p.agent_id() == Some(agent_id))
                .cloned()
                .collect();
            policies.sort_by_key(|p| p.created_at());
            Ok(policies)
        }

        async fn record_payment(
            &self,
            transaction: &Transaction,
            update: PolicyUpdate<'_>,
        ) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            state.check_version(&update)?;
            if state
                .transactions
                .iter()
                .any(|t| t.charge_id == transaction.charge_id)
            {
                return Err(PortError::conflict(format!(
                    "charge {} has already been applied",
                    transaction.charge_id
                )));
            }
            state.transactions.push(transaction.clone());
            state.apply(update);
            Ok(())
        }

        async fn transactions_for_policy(&self, policy_id: PolicyId) -> Result<Vec<Transaction>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .transactions
                .iter()
                .filter(|t| t.policy_id == policy_id)
                .cloned()
                .collect())
        }

        async fn insert_claim(&self, claim: NewClaim) -> Result<Claim, PortError> {
            let mut state = self.state.write().await;
            let id = ClaimId::new(state.claims.len() as i64 + 1);
            let claim = Claim::from_new(id, claim);
            state.claims.insert(id, claim.clone());
            Ok(claim)
        }

        async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
            self.state
                .read()
                .await
                .claims
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Claim", id))
        }

        async fn resolve_claim(
            &self,
            claim: &Claim,
            policy: Option<PolicyUpdate<'_>>,
        ) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            let stored = state
                .claims
                .get(&claim.id)
                .ok_or_else(|| PortError::not_found("Claim", claim.id))?;
            if !stored.status.is_pending() {
                return Err(PortError::conflict(format!("claim {} is no longer pending", claim.id)));
            }
            if let Some(update) = &policy {
                state.check_version(update)?;
            }
            state.claims.insert(claim.id, claim.clone());
            if let Some(update) = policy {
                state.apply(update);
            }
            Ok(())
        }

        async fn claims_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Claim>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .claims
                .values()
                .filter(|c| c.customer_id == customer_id)
                .cloned()
                .collect())
        }

        async fn pending_claims(&self) -> Result<Vec<Claim>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .claims
                .values()
                .filter(|c| c.status.is_pending())
                .cloned()
                .collect())
        }

        async fn insert_withdrawal(
            &self,
            request: NewWithdrawalRequest,
        ) -> Result<WithdrawalRequest, PortError> {
            let mut state = self.state.write().await;
            let id = WithdrawalId::new(state.withdrawals.len() as i64 + 1);
            let request = WithdrawalRequest::from_new(id, request);
            state.withdrawals.insert(id, request.clone());
            Ok(request)
        }

        async fn get_withdrawal(&self, id: WithdrawalId) -> Result<WithdrawalRequest, PortError> {
            self.state
                .read()
                .await
                .withdrawals
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("WithdrawalRequest", id))
        }

        async fn resolve_withdrawal(
            &self,
            request: &WithdrawalRequest,
            policy: Option<PolicyUpdate<'_>>,
        ) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            let stored = state
                .withdrawals
                .get(&request.id)
                .ok_or_else(|| PortError::not_found("WithdrawalRequest", request.id))?;
            if !stored.is_pending() {
                return Err(PortError::conflict(format!(
                    "withdrawal request {} is no longer pending",
                    request.id
                )));
            }
            if let Some(update) = &policy {
                state.check_version(update)?;
            }
            state.withdrawals.insert(request.id, request.clone());
            if let Some(update) = policy {
                state.apply(update);
            }
            Ok(())
        }

        async fn withdrawals_for_agent(&self, agent_id: AgentId) -> Result<Vec<WithdrawalRequest>, PortError> {
            let state = self.state.read().await;
            Ok(state
                .withdrawals
                .values()
                .filter(|w| state.agent_of(w.policy_id) == Some(agent_id))
                .cloned()
                .collect())
        }

        async fn pending_withdrawals(&self) -> Result<Vec<WithdrawalRequest>, PortError> {
            Ok(self
                .state
                .read()
                .await
                .withdrawals
                .values()
                .filter(|w| w.is_pending())
                .cloned()
                .collect())
        }

        async fn count_approved_withdrawals_for_agent(&self, agent_id: AgentId) -> Result<u64, PortError> {
            let state = self.state.read().await;
            Ok(state
                .withdrawals
                .values()
                .filter(|w| w.status == WithdrawalStatus::Approved)
                .filter(|w| state.agent_of(w.policy_id) == Some(agent_id))
                .count() as u64)
        }
    }
}
