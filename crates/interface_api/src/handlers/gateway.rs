//! Payment gateway callback
//!
//! The gateway reports every charge outcome here before the customer asks
//! for the payment to be applied. Requests carry the shared secret in the
//! `x-gateway-secret` header instead of a user token.

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use chrono::Utc;
use tracing::warn;
use validator::Validate;

use domain_billing::{CapturedCharge, PaymentGateway};
use domain_lifecycle::LifecycleError;

use crate::dto::gateway::CaptureNotification;
use crate::{error::ApiError, AppState};

pub const GATEWAY_SECRET_HEADER: &str = "x-gateway-secret";

pub async fn record_capture(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(notification): Json<CaptureNotification>,
) -> Result<(StatusCode, Json<CapturedCharge>), ApiError> {
    let presented = headers
        .get(GATEWAY_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    if presented != Some(state.config.gateway_webhook_secret.as_str()) {
        warn!("Gateway callback with a missing or wrong secret");
        return Err(ApiError::Unauthorized);
    }

    notification.validate()?;
    if notification.amount.is_sign_negative() || notification.amount.is_zero() {
        return Err(ApiError::BadRequest("amount must be positive".to_string()));
    }

    let recorded = state
        .engine
        .ports()
        .gateway
        .record_capture(notification.into_charge(Utc::now()))
        .await
        .map_err(LifecycleError::from)?;

    Ok((StatusCode::CREATED, Json(recorded)))
}
