//! Policy repository implementation
//!
//! Every update of a policy row is guarded by the version the caller loaded
//! and bumps nothing itself: the aggregate already carries its next version.
//! An update that matches no row means another writer got there first.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use core_kernel::{AgentId, CustomerId, Money, PlanId, PolicyId};
use domain_lifecycle::PolicyUpdate;
use domain_policy::{Policy, PolicyRecord};

use crate::error::DatabaseError;
use crate::repositories::catalog::{to_i32, to_u32};

const POLICY_COLUMNS: &str = r#"
    id, plan_id, customer_id, agent_id, start_date, end_date, term_years,
    total_investment, payment_interval, installment_amount, total_amount_paid,
    next_payment_date, status, version, created_at, updated_at
"#;

#[derive(Debug, Clone, FromRow)]
pub struct PolicyRow {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub customer_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub term_years: i32,
    pub total_investment: i64,
    pub payment_interval: String,
    pub installment_amount: i64,
    pub total_amount_paid: Decimal,
    pub next_payment_date: NaiveDate,
    pub status: String,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PolicyRow> for Policy {
    type Error = DatabaseError;

    fn try_from(row: PolicyRow) -> Result<Self, Self::Error> {
        Ok(Policy::from_record(PolicyRecord {
            id: PolicyId::from_uuid(row.id),
            plan_id: PlanId::from_uuid(row.plan_id),
            customer_id: CustomerId::from_uuid(row.customer_id),
            agent_id: row.agent_id.map(AgentId::from_uuid),
            start_date: row.start_date,
            end_date: row.end_date,
            term_years: to_u32(row.term_years)?,
            total_investment: row.total_investment,
            payment_interval: row.payment_interval.parse().map_err(DatabaseError::decode)?,
            installment_amount: row.installment_amount,
            total_amount_paid: Money::new(row.total_amount_paid),
            next_payment_date: row.next_payment_date,
            status: row.status.parse().map_err(DatabaseError::decode)?,
            version: to_u32(row.version)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

/// Repository for policies
#[derive(Debug, Clone)]
pub struct PolicyRepository {
    pool: PgPool,
}

impl PolicyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<PolicyRow, DatabaseError> {
        sqlx::query_as::<_, PolicyRow>(&format!(
            "SELECT {POLICY_COLUMNS} FROM policies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Policy", id))
    }

    pub async fn find_by_customer(&self, customer_id: Uuid) -> Result<Vec<PolicyRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PolicyRow>(&format!(
            "SELECT {POLICY_COLUMNS} FROM policies WHERE customer_id = $1 ORDER BY created_at"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_by_agent(&self, agent_id: Uuid) -> Result<Vec<PolicyRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PolicyRow>(&format!(
            "SELECT {POLICY_COLUMNS} FROM policies WHERE agent_id = $1 ORDER BY created_at"
        ))
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn insert(&self, policy: &Policy) -> Result<(), DatabaseError> {
        let record = policy.to_record();
        sqlx::query(&format!(
            r#"
            INSERT INTO policies ({POLICY_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#
        ))
        .bind(*record.id.as_uuid())
        .bind(*record.plan_id.as_uuid())
        .bind(*record.customer_id.as_uuid())
        .bind(record.agent_id.map(Uuid::from))
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(to_i32(record.term_years)?)
        .bind(record.total_investment)
        .bind(record.payment_interval.as_str())
        .bind(record.installment_amount)
        .bind(record.total_amount_paid.amount())
        .bind(record.next_payment_date)
        .bind(record.status.as_str())
        .bind(to_i32(record.version)?)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Writes the mutable columns if the row is still at the expected version
    ///
    /// Runs on the caller's connection so it can share a transaction with
    /// the row that triggered the change.
    pub async fn update_guarded(
        conn: &mut PgConnection,
        update: PolicyUpdate<'_>,
    ) -> Result<(), DatabaseError> {
        let record = update.policy.to_record();
        let result = sqlx::query(
            r#"
            UPDATE policies SET
                total_amount_paid = $3,
                next_payment_date = $4,
                status = $5,
                version = $6,
                updated_at = $7
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(*record.id.as_uuid())
        .bind(to_i32(update.expected_version)?)
        .bind(record.total_amount_paid.amount())
        .bind(record.next_payment_date)
        .bind(record.status.as_str())
        .bind(to_i32(record.version)?)
        .bind(record.updated_at)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<i32> = sqlx::query_scalar("SELECT version FROM policies WHERE id = $1")
                .bind(*record.id.as_uuid())
                .fetch_optional(&mut *conn)
                .await?;
            return Err(match exists {
                None => DatabaseError::not_found("Policy", record.id),
                Some(current) => DatabaseError::Conflict(format!(
                    "policy {} is at version {current}, expected {}",
                    record.id, update.expected_version
                )),
            });
        }
        Ok(())
    }
}
