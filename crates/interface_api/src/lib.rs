//! HTTP API Layer
//!
//! REST surface of the policy lifecycle engine using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: one module per area, each a thin call into [`LifecycleEngine`]
//! - **Middleware**: JWT authentication, audit logging, request ids, tracing
//! - **Auth guards**: role and ownership checks ahead of the engine
//! - **Error Handling**: engine errors mapped to status codes in [`error`]
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState { engine, config });
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_lifecycle::LifecycleEngine;

use crate::config::ApiConfig;
use crate::handlers::{agents, claims, gateway, health, policy, settings, withdrawals};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: LifecycleEngine,
    pub config: ApiConfig,
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no user token)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/api/v1/gateway/captures", post(gateway::record_capture));

    let policy_routes = Router::new()
        .route("/", post(policy::create_policy))
        .route("/:id", get(policy::get_policy))
        .route("/:id/quote", get(policy::quote_installment))
        .route("/:id/payments", post(policy::confirm_payment))
        .route("/:id/transactions", get(policy::list_transactions));

    let customer_routes = Router::new()
        .route("/:id/policies", get(policy::list_customer_policies))
        .route("/:id/claims", get(claims::list_customer_claims));

    let agent_routes = Router::new()
        .route("/:id/policies", get(agents::list_policies))
        .route("/:id/commissions", get(agents::list_commissions))
        .route("/:id/commission-summary", get(agents::commission_summary))
        .route("/:id/withdrawals", get(agents::list_withdrawals));

    let claims_routes = Router::new()
        .route("/", post(claims::submit_claim))
        .route("/pending", get(claims::list_pending))
        .route("/:id/approve", post(claims::approve_claim))
        .route("/:id/reject", post(claims::reject_claim));

    let withdrawal_routes = Router::new()
        .route("/", post(withdrawals::request_withdrawal))
        .route("/pending", get(withdrawals::list_pending))
        .route("/:id/approve", post(withdrawals::approve_withdrawal))
        .route("/:id/reject", post(withdrawals::reject_withdrawal));

    let settings_routes = Router::new()
        .route("/", get(settings::current_settings))
        .route("/tax", post(settings::publish_tax))
        .route("/insurance", post(settings::publish_insurance));

    // Protected API routes; auth runs first so the audit log sees the actor
    let api_routes = Router::new()
        .nest("/policies", policy_routes)
        .nest("/customers", customer_routes)
        .nest("/agents", agent_routes)
        .nest("/claims", claims_routes)
        .nest("/withdrawals", withdrawal_routes)
        .nest("/settings", settings_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
