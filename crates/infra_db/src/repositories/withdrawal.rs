//! Withdrawal request repository implementation

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use core_kernel::{AdminId, CustomerId, PolicyId, WithdrawalId};
use domain_withdrawal::{NewWithdrawalRequest, WithdrawalRequest, WithdrawalStatus};

use crate::error::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct WithdrawalRow {
    pub id: i64,
    pub policy_id: Uuid,
    pub customer_id: Uuid,
    pub status: String,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub requested_at: DateTime<Utc>,
}

impl TryFrom<WithdrawalRow> for WithdrawalRequest {
    type Error = DatabaseError;

    fn try_from(row: WithdrawalRow) -> Result<Self, Self::Error> {
        Ok(WithdrawalRequest {
            id: WithdrawalId::new(row.id),
            policy_id: PolicyId::from_uuid(row.policy_id),
            customer_id: CustomerId::from_uuid(row.customer_id),
            requested_at: row.requested_at,
            status: row.status.parse().map_err(DatabaseError::decode)?,
            resolved_by: row.resolved_by.map(AdminId::from_uuid),
            resolved_at: row.resolved_at,
        })
    }
}

/// Repository for withdrawal requests
#[derive(Debug, Clone)]
pub struct WithdrawalRepository {
    pool: PgPool,
}

impl WithdrawalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, request: &NewWithdrawalRequest) -> Result<WithdrawalRow, DatabaseError> {
        let row = sqlx::query_as::<_, WithdrawalRow>(
            r#"
            INSERT INTO withdrawal_requests (policy_id, customer_id, status, requested_at)
            VALUES ($1, $2, 'PENDING', $3)
            RETURNING id, policy_id, customer_id, status, resolved_by, resolved_at, requested_at
            "#,
        )
        .bind(*request.policy_id.as_uuid())
        .bind(*request.customer_id.as_uuid())
        .bind(request.requested_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<WithdrawalRow, DatabaseError> {
        sqlx::query_as::<_, WithdrawalRow>(
            r#"
            SELECT id, policy_id, customer_id, status, resolved_by, resolved_at, requested_at
            FROM withdrawal_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("WithdrawalRequest", WithdrawalId::new(id)))
    }

    /// Moves a pending request to its resolved status on the caller's connection
    pub async fn resolve(
        conn: &mut PgConnection,
        request: &WithdrawalRequest,
    ) -> Result<(), DatabaseError> {
        if request.status == WithdrawalStatus::Pending {
            return Err(DatabaseError::ConstraintViolation(format!(
                "{} is still pending",
                request.id
            )));
        }

        let result = sqlx::query(
            r#"
            UPDATE withdrawal_requests SET status = $2, resolved_by = $3, resolved_at = $4
            WHERE id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(request.id.value())
        .bind(request.status.as_str())
        .bind(request.resolved_by.map(Uuid::from))
        .bind(request.resolved_at)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::Conflict(format!("{} is not pending", request.id)));
        }
        Ok(())
    }

    /// Requests against policies sold by an agent
    pub async fn find_by_agent(&self, agent_id: Uuid) -> Result<Vec<WithdrawalRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, WithdrawalRow>(
            r#"
            SELECT w.id, w.policy_id, w.customer_id, w.status, w.resolved_by, w.resolved_at,
                   w.requested_at
            FROM withdrawal_requests w
            JOIN policies p ON p.id = w.policy_id
            WHERE p.agent_id = $1
            ORDER BY w.requested_at, w.id
            "#,
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_pending(&self) -> Result<Vec<WithdrawalRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, WithdrawalRow>(
            r#"
            SELECT id, policy_id, customer_id, status, resolved_by, resolved_at, requested_at
            FROM withdrawal_requests
            WHERE status = 'PENDING'
            ORDER BY requested_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn count_approved_by_agent(&self, agent_id: Uuid) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM withdrawal_requests w
            JOIN policies p ON p.id = w.policy_id
            WHERE p.agent_id = $1 AND w.status = 'APPROVED'
            "#,
        )
        .bind(agent_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
