//! Party repository implementation
//!
//! Customers, agents, admins and employees live in one table per kind.
//! Saves are upserts keyed by id.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use core_kernel::{AdminId, AgentId, CustomerId, EmployeeId};
use domain_party::{Admin, Agent, Customer, Employee, VerificationStatus};

use crate::error::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct CustomerRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub verification_status: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = DatabaseError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        Ok(Customer {
            id: CustomerId::from_uuid(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            date_of_birth: row.date_of_birth,
            verification_status: row
                .verification_status
                .parse()
                .map_err(DatabaseError::decode)?,
            active: row.active,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AgentRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<AgentRow> for Agent {
    fn from(row: AgentRow) -> Self {
        Agent {
            id: AgentId::from_uuid(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

/// Admins and employees share a shape
#[derive(Debug, Clone, FromRow)]
pub struct StaffRow {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

impl From<StaffRow> for Admin {
    fn from(row: StaffRow) -> Self {
        Admin {
            id: AdminId::from_uuid(row.id),
            name: row.name,
            active: row.active,
        }
    }
}

impl From<StaffRow> for Employee {
    fn from(row: StaffRow) -> Self {
        Employee {
            id: EmployeeId::from_uuid(row.id),
            name: row.name,
            active: row.active,
        }
    }
}

/// Repository for parties
#[derive(Debug, Clone)]
pub struct PartyRepository {
    pool: PgPool,
}

impl PartyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_customer(&self, id: Uuid) -> Result<CustomerRow, DatabaseError> {
        sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT id, first_name, last_name, email, date_of_birth,
                   verification_status, active, created_at
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Customer", id))
    }

    pub async fn upsert_customer(&self, customer: &Customer) -> Result<CustomerRow, DatabaseError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r#"
            INSERT INTO customers (
                id, first_name, last_name, email, date_of_birth,
                verification_status, active, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                email = EXCLUDED.email,
                date_of_birth = EXCLUDED.date_of_birth,
                verification_status = EXCLUDED.verification_status,
                active = EXCLUDED.active
            RETURNING id, first_name, last_name, email, date_of_birth,
                      verification_status, active, created_at
            "#,
        )
        .bind(*customer.id.as_uuid())
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.email)
        .bind(customer.date_of_birth)
        .bind(customer.verification_status.as_str())
        .bind(customer.active)
        .bind(customer.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_verification_status(
        &self,
        id: Uuid,
        status: VerificationStatus,
    ) -> Result<CustomerRow, DatabaseError> {
        sqlx::query_as::<_, CustomerRow>(
            r#"
            UPDATE customers SET verification_status = $2
            WHERE id = $1
            RETURNING id, first_name, last_name, email, date_of_birth,
                      verification_status, active, created_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Customer", id))
    }

    pub async fn get_agent(&self, id: Uuid) -> Result<AgentRow, DatabaseError> {
        sqlx::query_as::<_, AgentRow>(
            "SELECT id, first_name, last_name, email, active, created_at FROM agents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Agent", id))
    }

    pub async fn upsert_agent(&self, agent: &Agent) -> Result<AgentRow, DatabaseError> {
        let row = sqlx::query_as::<_, AgentRow>(
            r#"
            INSERT INTO agents (id, first_name, last_name, email, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                email = EXCLUDED.email,
                active = EXCLUDED.active
            RETURNING id, first_name, last_name, email, active, created_at
            "#,
        )
        .bind(*agent.id.as_uuid())
        .bind(&agent.first_name)
        .bind(&agent.last_name)
        .bind(&agent.email)
        .bind(agent.active)
        .bind(agent.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_admin(&self, id: Uuid) -> Result<StaffRow, DatabaseError> {
        sqlx::query_as::<_, StaffRow>("SELECT id, name, active FROM admins WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Admin", id))
    }

    pub async fn upsert_admin(&self, admin: &Admin) -> Result<StaffRow, DatabaseError> {
        let row = sqlx::query_as::<_, StaffRow>(
            r#"
            INSERT INTO admins (id, name, active) VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, active = EXCLUDED.active
            RETURNING id, name, active
            "#,
        )
        .bind(*admin.id.as_uuid())
        .bind(&admin.name)
        .bind(admin.active)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_employee(&self, id: Uuid) -> Result<StaffRow, DatabaseError> {
        sqlx::query_as::<_, StaffRow>("SELECT id, name, active FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Employee", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_verification_status_is_rejected() {
        let row = CustomerRow {
            id: Uuid::new_v4(),
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.com".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            verification_status: "MAYBE".to_string(),
            active: true,
            created_at: Utc::now(),
        };
        assert!(matches!(
            Customer::try_from(row),
            Err(DatabaseError::SerializationError(_))
        ));
    }
}
