//! Tax and insurance setting handlers

use axum::{extract::State, http::StatusCode, Extension, Json};

use domain_billing::{InsuranceSetting, NewInsuranceSetting, NewTaxSetting, TaxSetting};
use domain_lifecycle::CurrentSettings;
use domain_party::Actor;

use crate::auth;
use crate::dto::Confirmation;
use crate::{error::ApiError, AppState};

/// Current snapshots; readable by every authenticated caller
pub async fn current_settings(
    State(state): State<AppState>,
) -> Result<Json<CurrentSettings>, ApiError> {
    Ok(Json(state.engine.current_settings().await?))
}

pub async fn publish_tax(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(setting): Json<NewTaxSetting>,
) -> Result<(StatusCode, Json<Confirmation<TaxSetting>>), ApiError> {
    auth::require_admin(&actor)?;
    let published = state.engine.publish_tax_setting(setting).await?;
    Ok((
        StatusCode::CREATED,
        Json(Confirmation::new("Tax setting published", published)),
    ))
}

pub async fn publish_insurance(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(setting): Json<NewInsuranceSetting>,
) -> Result<(StatusCode, Json<Confirmation<InsuranceSetting>>), ApiError> {
    auth::require_admin(&actor)?;
    let published = state.engine.publish_insurance_setting(setting).await?;
    Ok((
        StatusCode::CREATED,
        Json(Confirmation::new("Insurance setting published", published)),
    ))
}
