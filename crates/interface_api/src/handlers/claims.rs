//! Claim handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::{ClaimId, CustomerId};
use domain_claims::Claim;
use domain_lifecycle::ClaimResolution;
use domain_party::Actor;

use crate::auth;
use crate::dto::claims::SubmitClaimRequest;
use crate::dto::Confirmation;
use crate::{error::ApiError, AppState};

/// Files a claim on one of the caller's policies
pub async fn submit_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<SubmitClaimRequest>,
) -> Result<(StatusCode, Json<Confirmation<Claim>>), ApiError> {
    let customer_id = auth::require_customer(&actor)?;
    request.validate()?;

    let claim = state.engine.submit_claim(customer_id, request.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(Confirmation::new(format!("Claim {} submitted", claim.id), claim)),
    ))
}

pub async fn list_customer_claims(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(customer_id): Path<CustomerId>,
) -> Result<Json<Vec<Claim>>, ApiError> {
    auth::ensure_customer_access(&actor, customer_id)?;
    Ok(Json(state.engine.claims_for_customer(customer_id).await?))
}

/// Claims waiting for an admin, oldest first
pub async fn list_pending(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Claim>>, ApiError> {
    auth::require_back_office(&actor)?;
    Ok(Json(state.engine.pending_claims().await?))
}

pub async fn approve_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<ClaimId>,
) -> Result<Json<Confirmation<ClaimResolution>>, ApiError> {
    let admin_id = auth::require_admin(&actor)?;
    let resolution = state.engine.approve_claim(id, admin_id).await?;
    Ok(Json(Confirmation::new(format!("Claim {id} approved"), resolution)))
}

pub async fn reject_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<ClaimId>,
) -> Result<Json<Confirmation<ClaimResolution>>, ApiError> {
    let admin_id = auth::require_admin(&actor)?;
    let resolution = state.engine.reject_claim(id, admin_id).await?;
    Ok(Json(Confirmation::new(format!("Claim {id} rejected"), resolution)))
}
