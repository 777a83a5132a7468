//! Party Domain Ports
//!
//! The lifecycle engine only reads parties: it needs a customer's date of
//! birth and verification status, an agent's existence, and an approver's
//! admin standing. Registration and profile editing live outside the engine,
//! so the write side of this port is limited to what adapters and tests need
//! to seed records.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_party::ports::PartyPort;
//! use std::sync::Arc;
//!
//! pub struct Engine {
//!     parties: Arc<dyn PartyPort>,
//! }
//!
//! impl Engine {
//!     pub async fn owner(&self, id: CustomerId) -> Result<Customer, PortError> {
//!         self.parties.get_customer(id).await
//!     }
//! }
//! ```

use async_trait::async_trait;

use core_kernel::{
    AdminId, AgentId, CustomerId, DomainPort, EmployeeId, HealthCheckable, PortError,
};

use crate::agent::Agent;
use crate::kyc::VerificationStatus;
use crate::party::{Admin, Customer, Employee};

/// The port trait for party lookups
///
/// Every lookup fails with `PortError::NotFound` when the party is absent.
#[async_trait]
pub trait PartyPort: DomainPort + HealthCheckable {
    // ========================================================================
    // Lookups
    // ========================================================================

    /// Retrieves a customer by ID
    async fn get_customer(&self, id: CustomerId) -> Result<Customer, PortError>;

    /// Retrieves an agent by ID
    async fn get_agent(&self, id: AgentId) -> Result<Agent, PortError>;

    /// Retrieves an admin by ID
    async fn get_admin(&self, id: AdminId) -> Result<Admin, PortError>;

    /// Retrieves an employee by ID
    async fn get_employee(&self, id: EmployeeId) -> Result<Employee, PortError>;

    // ========================================================================
    // Seeding
    // ========================================================================

    /// Inserts or replaces a customer
    async fn save_customer(&self, customer: Customer) -> Result<Customer, PortError>;

    /// Inserts or replaces an agent
    async fn save_agent(&self, agent: Agent) -> Result<Agent, PortError>;

    /// Inserts or replaces an admin
    async fn save_admin(&self, admin: Admin) -> Result<Admin, PortError>;

    /// Records the back-office verification decision for a customer
    async fn update_verification_status(
        &self,
        id: CustomerId,
        status: VerificationStatus,
    ) -> Result<Customer, PortError>;
}

/// Mock implementation of PartyPort for testing
///
/// Stores parties in memory; useful for unit testing without a database.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    /// In-memory mock implementation of PartyPort
    #[derive(Debug, Default, Clone)]
    pub struct MockPartyPort {
        customers: Arc<RwLock<HashMap<CustomerId, Customer>>>,
        agents: Arc<RwLock<HashMap<AgentId, Agent>>>,
        admins: Arc<RwLock<HashMap<AdminId, Admin>>>,
        employees: Arc<RwLock<HashMap<EmployeeId, Employee>>>,
    }

    impl MockPartyPort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with an employee for testing
        pub async fn insert_employee(&self, employee: Employee) {
            self.employees.write().await.insert(employee.id, employee);
        }
    }

    impl DomainPort for MockPartyPort {}

    #[async_trait]
    impl HealthCheckable for MockPartyPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                message: Some("Mock adapter always healthy".to_string()),
                ..HealthCheckResult::healthy("mock-party-port")
            }
        }
    }

    #[async_trait]
    impl PartyPort for MockPartyPort {
        async fn get_customer(&self, id: CustomerId) -> Result<Customer, PortError> {
            self.customers
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Customer", id))
        }

        async fn get_agent(&self, id: AgentId) -> Result<Agent, PortError> {
            self.agents
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Agent", id))
        }

        async fn get_admin(&self, id: AdminId) -> Result<Admin, PortError> {
            self.admins
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Admin", id))
        }

        async fn get_employee(&self, id: EmployeeId) -> Result<Employee, PortError> {
            self.employees
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Employee", id))
        }

        async fn save_customer(&self, customer: Customer) -> Result<Customer, PortError> {
            self.customers.write().await.insert(customer.id, customer.clone());
            Ok(customer)
        }

        async fn save_agent(&self, agent: Agent) -> Result<Agent, PortError> {
            self.agents.write().await.insert(agent.id, agent.clone());
            Ok(agent)
        }

        async fn save_admin(&self, admin: Admin) -> Result<Admin, PortError> {
            self.admins.write().await.insert(admin.id, admin.clone());
            Ok(admin)
        }

        async fn update_verification_status(
            &self,
            id: CustomerId,
            status: VerificationStatus,
        ) -> Result<Customer, PortError> {
            let mut customers = self.customers.write().await;
            let customer = customers
                .get_mut(&id)
                .ok_or_else(|| PortError::not_found("Customer", id))?;
            customer.verification_status = status;
            Ok(customer.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockPartyPort;
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_mock_port_save_and_get() {
        let port = MockPartyPort::new();
        let customer = Customer::new(
            "John",
            "Doe",
            "john@example.com",
            NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
        );

        port.save_customer(customer.clone()).await.unwrap();
        let retrieved = port.get_customer(customer.id).await.unwrap();
        assert_eq!(retrieved, customer);
    }

    #[tokio::test]
    async fn test_mock_port_not_found() {
        let port = MockPartyPort::new();
        let result = port.get_agent(AgentId::new_v7()).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_mock_port_verification_update() {
        let port = MockPartyPort::new();
        let customer = Customer::new(
            "John",
            "Doe",
            "john@example.com",
            NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
        );
        port.save_customer(customer.clone()).await.unwrap();

        let updated = port
            .update_verification_status(customer.id, VerificationStatus::Approved)
            .await
            .unwrap();
        assert!(updated.is_verified());
    }

    #[tokio::test]
    async fn test_mock_port_health_check() {
        let port = MockPartyPort::new();
        let result = port.health_check().await;
        assert_eq!(result.status, core_kernel::AdapterHealth::Healthy);
    }
}
