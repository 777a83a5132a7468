//! Catalog repository implementation

use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use core_kernel::{PlanId, SchemeId};
use domain_policy::{InsurancePlan, InsuranceScheme};

use crate::error::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct SchemeRow {
    pub id: Uuid,
    pub name: String,
    pub new_registration_commission: Decimal,
    pub withdrawal_penalty: Decimal,
    pub active: bool,
}

impl From<SchemeRow> for InsuranceScheme {
    fn from(row: SchemeRow) -> Self {
        InsuranceScheme {
            id: SchemeId::from_uuid(row.id),
            name: row.name,
            new_registration_commission: row.new_registration_commission,
            withdrawal_penalty: row.withdrawal_penalty,
            active: row.active,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PlanRow {
    pub id: Uuid,
    pub scheme_id: Uuid,
    pub name: String,
    pub min_term_years: i32,
    pub max_term_years: i32,
    pub min_age: i32,
    pub max_age: i32,
    pub min_investment: i64,
    pub max_investment: i64,
    pub profit_ratio: Decimal,
    pub active: bool,
}

impl TryFrom<PlanRow> for InsurancePlan {
    type Error = DatabaseError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        Ok(InsurancePlan {
            id: PlanId::from_uuid(row.id),
            scheme_id: SchemeId::from_uuid(row.scheme_id),
            name: row.name,
            min_term_years: to_u32(row.min_term_years)?,
            max_term_years: to_u32(row.max_term_years)?,
            min_age: to_u32(row.min_age)?,
            max_age: to_u32(row.max_age)?,
            min_investment: row.min_investment,
            max_investment: row.max_investment,
            profit_ratio: row.profit_ratio,
            active: row.active,
        })
    }
}

pub(crate) fn to_u32(value: i32) -> Result<u32, DatabaseError> {
    u32::try_from(value).map_err(DatabaseError::decode)
}

pub(crate) fn to_i32(value: u32) -> Result<i32, DatabaseError> {
    i32::try_from(value).map_err(DatabaseError::decode)
}

/// Repository for schemes and plans
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_scheme(&self, id: Uuid) -> Result<SchemeRow, DatabaseError> {
        sqlx::query_as::<_, SchemeRow>(
            r#"
            SELECT id, name, new_registration_commission, withdrawal_penalty, active
            FROM insurance_schemes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("InsuranceScheme", id))
    }

    pub async fn get_plan(&self, id: Uuid) -> Result<PlanRow, DatabaseError> {
        sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT id, scheme_id, name, min_term_years, max_term_years, min_age, max_age,
                   min_investment, max_investment, profit_ratio, active
            FROM insurance_plans
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("InsurancePlan", id))
    }

    pub async fn upsert_scheme(&self, scheme: &InsuranceScheme) -> Result<SchemeRow, DatabaseError> {
        let row = sqlx::query_as::<_, SchemeRow>(
            r#"
            INSERT INTO insurance_schemes (
                id, name, new_registration_commission, withdrawal_penalty, active
            ) VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                new_registration_commission = EXCLUDED.new_registration_commission,
                withdrawal_penalty = EXCLUDED.withdrawal_penalty,
                active = EXCLUDED.active
            RETURNING id, name, new_registration_commission, withdrawal_penalty, active
            "#,
        )
        .bind(*scheme.id.as_uuid())
        .bind(&scheme.name)
        .bind(scheme.new_registration_commission)
        .bind(scheme.withdrawal_penalty)
        .bind(scheme.active)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn upsert_plan(&self, plan: &InsurancePlan) -> Result<PlanRow, DatabaseError> {
        let row = sqlx::query_as::<_, PlanRow>(
            r#"
            INSERT INTO insurance_plans (
                id, scheme_id, name, min_term_years, max_term_years, min_age, max_age,
                min_investment, max_investment, profit_ratio, active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                scheme_id = EXCLUDED.scheme_id,
                name = EXCLUDED.name,
                min_term_years = EXCLUDED.min_term_years,
                max_term_years = EXCLUDED.max_term_years,
                min_age = EXCLUDED.min_age,
                max_age = EXCLUDED.max_age,
                min_investment = EXCLUDED.min_investment,
                max_investment = EXCLUDED.max_investment,
                profit_ratio = EXCLUDED.profit_ratio,
                active = EXCLUDED.active
            RETURNING id, scheme_id, name, min_term_years, max_term_years, min_age, max_age,
                      min_investment, max_investment, profit_ratio, active
            "#,
        )
        .bind(*plan.id.as_uuid())
        .bind(*plan.scheme_id.as_uuid())
        .bind(&plan.name)
        .bind(to_i32(plan.min_term_years)?)
        .bind(to_i32(plan.max_term_years)?)
        .bind(to_i32(plan.min_age)?)
        .bind(to_i32(plan.max_age)?)
        .bind(plan.min_investment)
        .bind(plan.max_investment)
        .bind(plan.profit_ratio)
        .bind(plan.active)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
