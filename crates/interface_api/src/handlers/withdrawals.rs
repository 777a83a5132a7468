//! Withdrawal handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use core_kernel::WithdrawalId;
use domain_lifecycle::WithdrawalResolution;
use domain_party::Actor;
use domain_withdrawal::WithdrawalRequest;

use crate::auth;
use crate::dto::withdrawals::WithdrawalRequestBody;
use crate::dto::Confirmation;
use crate::{error::ApiError, AppState};

/// Asks to withdraw from one of the caller's policies
pub async fn request_withdrawal(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<WithdrawalRequestBody>,
) -> Result<(StatusCode, Json<Confirmation<WithdrawalRequest>>), ApiError> {
    let customer_id = auth::require_customer(&actor)?;
    let request = state
        .engine
        .request_withdrawal(customer_id, body.policy_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(Confirmation::new(
            format!("Withdrawal request {} submitted", request.id),
            request,
        )),
    ))
}

pub async fn list_pending(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<WithdrawalRequest>>, ApiError> {
    auth::require_back_office(&actor)?;
    Ok(Json(state.engine.pending_withdrawals().await?))
}

pub async fn approve_withdrawal(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<WithdrawalId>,
) -> Result<Json<Confirmation<WithdrawalResolution>>, ApiError> {
    let admin_id = auth::require_admin(&actor)?;
    let resolution = state.engine.approve_withdrawal(id, admin_id).await?;
    Ok(Json(Confirmation::new(
        format!("Withdrawal request {id} approved"),
        resolution,
    )))
}

pub async fn reject_withdrawal(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<WithdrawalId>,
) -> Result<Json<Confirmation<WithdrawalResolution>>, ApiError> {
    let admin_id = auth::require_admin(&actor)?;
    let resolution = state.engine.reject_withdrawal(id, admin_id).await?;
    Ok(Json(Confirmation::new(
        format!("Withdrawal request {id} rejected"),
        resolution,
    )))
}
