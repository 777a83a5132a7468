//! Billing repository implementation
//!
//! Transactions and settings snapshots are append-only. Gateway captures are
//! keyed by charge id; re-reporting an identical capture is a no-op.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use core_kernel::{InsuranceSettingId, Money, PolicyId, TaxSettingId, TransactionId};
use domain_billing::{
    CapturedCharge, InsuranceSetting, NewInsuranceSetting, NewTaxSetting, TaxSetting, Transaction,
};

use crate::error::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub amount: Decimal,
    pub charge_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DatabaseError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: TransactionId::from_uuid(row.id),
            policy_id: PolicyId::from_uuid(row.policy_id),
            amount: Money::new(row.amount),
            charge_id: row.charge_id,
            timestamp: row.created_at,
            status: row.status.parse().map_err(DatabaseError::decode)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TaxSettingRow {
    pub id: i64,
    pub tax_percentage: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<TaxSettingRow> for TaxSetting {
    fn from(row: TaxSettingRow) -> Self {
        TaxSetting {
            id: TaxSettingId::new(row.id),
            tax_percentage: row.tax_percentage,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct InsuranceSettingRow {
    pub id: i64,
    pub claim_deduction: Decimal,
    pub withdrawal_penalty: Decimal,
    pub late_penalty: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<InsuranceSettingRow> for InsuranceSetting {
    fn from(row: InsuranceSettingRow) -> Self {
        InsuranceSetting {
            id: InsuranceSettingId::new(row.id),
            claim_deduction: row.claim_deduction,
            withdrawal_penalty: row.withdrawal_penalty,
            late_penalty: row.late_penalty,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CaptureRow {
    pub charge_id: String,
    pub policy_id: Uuid,
    pub amount: Decimal,
    pub succeeded: bool,
    pub captured_at: DateTime<Utc>,
}

impl From<CaptureRow> for CapturedCharge {
    fn from(row: CaptureRow) -> Self {
        CapturedCharge {
            charge_id: row.charge_id,
            policy_id: PolicyId::from_uuid(row.policy_id),
            amount: Money::new(row.amount),
            succeeded: row.succeeded,
            captured_at: row.captured_at,
        }
    }
}

/// Repository for transactions, settings and gateway captures
#[derive(Debug, Clone)]
pub struct BillingRepository {
    pool: PgPool,
}

impl BillingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends a transaction on the caller's connection
    ///
    /// A reused charge id violates the unique index and surfaces as
    /// `DuplicateEntry`.
    pub async fn insert_transaction(
        conn: &mut PgConnection,
        transaction: &Transaction,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, policy_id, amount, charge_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*transaction.id.as_uuid())
        .bind(*transaction.policy_id.as_uuid())
        .bind(transaction.amount.amount())
        .bind(&transaction.charge_id)
        .bind(transaction.status.as_str())
        .bind(transaction.timestamp)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn transactions_for_policy(
        &self,
        policy_id: Uuid,
    ) -> Result<Vec<TransactionRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, policy_id, amount, charge_id, status, created_at
            FROM transactions
            WHERE policy_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(policy_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn latest_tax_setting(&self) -> Result<Option<TaxSettingRow>, DatabaseError> {
        let row = sqlx::query_as::<_, TaxSettingRow>(
            r#"
            SELECT id, tax_percentage, created_at
            FROM tax_settings
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn latest_insurance_setting(
        &self,
    ) -> Result<Option<InsuranceSettingRow>, DatabaseError> {
        let row = sqlx::query_as::<_, InsuranceSettingRow>(
            r#"
            SELECT id, claim_deduction, withdrawal_penalty, late_penalty, created_at
            FROM insurance_settings
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn insert_tax_setting(
        &self,
        setting: &NewTaxSetting,
    ) -> Result<TaxSettingRow, DatabaseError> {
        let row = sqlx::query_as::<_, TaxSettingRow>(
            r#"
            INSERT INTO tax_settings (tax_percentage)
            VALUES ($1)
            RETURNING id, tax_percentage, created_at
            "#,
        )
        .bind(setting.tax_percentage)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn insert_insurance_setting(
        &self,
        setting: &NewInsuranceSetting,
    ) -> Result<InsuranceSettingRow, DatabaseError> {
        let row = sqlx::query_as::<_, InsuranceSettingRow>(
            r#"
            INSERT INTO insurance_settings (claim_deduction, withdrawal_penalty, late_penalty)
            VALUES ($1, $2, $3)
            RETURNING id, claim_deduction, withdrawal_penalty, late_penalty, created_at
            "#,
        )
        .bind(setting.claim_deduction)
        .bind(setting.withdrawal_penalty)
        .bind(setting.late_penalty)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_capture(&self, charge_id: &str) -> Result<CaptureRow, DatabaseError> {
        sqlx::query_as::<_, CaptureRow>(
            r#"
            SELECT charge_id, policy_id, amount, succeeded, captured_at
            FROM gateway_captures
            WHERE charge_id = $1
            "#,
        )
        .bind(charge_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Charge", charge_id))
    }

    /// Stores a capture, accepting an identical re-report
    pub async fn insert_capture(&self, capture: &CapturedCharge) -> Result<CaptureRow, DatabaseError> {
        let inserted = sqlx::query_as::<_, CaptureRow>(
            r#"
            INSERT INTO gateway_captures (charge_id, policy_id, amount, succeeded, captured_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (charge_id) DO NOTHING
            RETURNING charge_id, policy_id, amount, succeeded, captured_at
            "#,
        )
        .bind(&capture.charge_id)
        .bind(*capture.policy_id.as_uuid())
        .bind(capture.amount.amount())
        .bind(capture.succeeded)
        .bind(capture.captured_at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(row);
        }

        let existing = self.find_capture(&capture.charge_id).await?;
        let same = existing.policy_id == *capture.policy_id.as_uuid()
            && existing.amount == capture.amount.amount()
            && existing.succeeded == capture.succeeded;
        if same {
            Ok(existing)
        } else {
            Err(DatabaseError::Conflict(format!(
                "charge {} was already reported with different details",
                capture.charge_id
            )))
        }
    }
}
