//! Claims repository implementation
//!
//! Claims are inserted PENDING and resolved by a single guarded update; a
//! claim that is no longer pending is never rewritten.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use core_kernel::{AdminId, ClaimId, CustomerId, DocumentId, PolicyId};
use domain_claims::{Claim, ClaimStatus, Document, NewClaim};

use crate::error::DatabaseError;

const CLAIM_COLUMNS: &str = r#"
    id, policy_id, customer_id, explanation, document_ids,
    status, resolved_by, resolved_at, submitted_at
"#;

#[derive(Debug, Clone, FromRow)]
pub struct ClaimRow {
    pub id: i64,
    pub policy_id: Uuid,
    pub customer_id: Uuid,
    pub explanation: String,
    pub document_ids: Vec<Uuid>,
    pub status: String,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = DatabaseError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        let status = ClaimStatus::from_parts(
            &row.status,
            row.resolved_by.map(AdminId::from_uuid),
            row.resolved_at,
        )
        .map_err(DatabaseError::decode)?;

        Ok(Claim {
            id: ClaimId::new(row.id),
            policy_id: PolicyId::from_uuid(row.policy_id),
            customer_id: CustomerId::from_uuid(row.customer_id),
            explanation: row.explanation,
            document_ids: row.document_ids.into_iter().map(DocumentId::from_uuid).collect(),
            status,
            submitted_at: row.submitted_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: DocumentId::from_uuid(row.id),
            customer_id: CustomerId::from_uuid(row.customer_id),
            name: row.name,
            uploaded_at: row.uploaded_at,
        }
    }
}

/// Repository for claims and their supporting documents
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, claim: &NewClaim) -> Result<ClaimRow, DatabaseError> {
        let documents: Vec<Uuid> = claim.document_ids.iter().map(|id| *id.as_uuid()).collect();
        let row = sqlx::query_as::<_, ClaimRow>(&format!(
            r#"
            INSERT INTO claims (policy_id, customer_id, explanation, document_ids, status, submitted_at)
            VALUES ($1, $2, $3, $4, 'PENDING', $5)
            RETURNING {CLAIM_COLUMNS}
            "#
        ))
        .bind(*claim.policy_id.as_uuid())
        .bind(*claim.customer_id.as_uuid())
        .bind(claim.explanation.trim())
        .bind(documents)
        .bind(claim.submitted_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<ClaimRow, DatabaseError> {
        sqlx::query_as::<_, ClaimRow>(&format!("SELECT {CLAIM_COLUMNS} FROM claims WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Claim", ClaimId::new(id)))
    }

    /// Moves a pending claim to its resolved status on the caller's connection
    pub async fn resolve(conn: &mut PgConnection, claim: &Claim) -> Result<(), DatabaseError> {
        let (resolved_by, resolved_at) = claim
            .status
            .resolution()
            .ok_or_else(|| DatabaseError::ConstraintViolation(format!("{} is still pending", claim.id)))?;

        let result = sqlx::query(
            r#"
            UPDATE claims SET status = $2, resolved_by = $3, resolved_at = $4
            WHERE id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(claim.id.value())
        .bind(claim.status.as_str())
        .bind(*resolved_by.as_uuid())
        .bind(resolved_at)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::Conflict(format!(
                "{} is not pending",
                claim.id
            )));
        }
        Ok(())
    }

    pub async fn find_by_customer(&self, customer_id: Uuid) -> Result<Vec<ClaimRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ClaimRow>(&format!(
            "SELECT {CLAIM_COLUMNS} FROM claims WHERE customer_id = $1 ORDER BY submitted_at, id"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_pending(&self) -> Result<Vec<ClaimRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ClaimRow>(&format!(
            "SELECT {CLAIM_COLUMNS} FROM claims WHERE status = 'PENDING' ORDER BY submitted_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_document(&self, id: Uuid) -> Result<DocumentRow, DatabaseError> {
        sqlx::query_as::<_, DocumentRow>(
            "SELECT id, customer_id, name, uploaded_at FROM documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Document", DocumentId::from_uuid(id)))
    }

    pub async fn insert_document(&self, document: &Document) -> Result<DocumentRow, DatabaseError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (id, customer_id, name, uploaded_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, customer_id, name, uploaded_at
            "#,
        )
        .bind(*document.id.as_uuid())
        .bind(*document.customer_id.as_uuid())
        .bind(&document.name)
        .bind(document.uploaded_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
