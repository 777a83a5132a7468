//! Policy handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::{CustomerId, PolicyId};
use domain_billing::{AmountDue, Transaction};
use domain_lifecycle::{PaymentReceipt, PolicyApplication, PolicyView};
use domain_party::Actor;
use domain_policy::PaymentInterval;

use crate::auth::{self, AuthError};
use crate::dto::policy::*;
use crate::dto::Confirmation;
use crate::{error::ApiError, AppState};

/// Works out whose policy is being registered and through which agent
fn resolve_application(
    actor: &Actor,
    request: CreatePolicyRequest,
) -> Result<PolicyApplication, ApiError> {
    let payment_interval: PaymentInterval = request
        .payment_interval
        .parse()
        .map_err(domain_lifecycle::LifecycleError::from)?;

    let (customer_id, agent_id) = match actor {
        Actor::Customer(id) => {
            let customer_id = request.customer_id.unwrap_or(*id);
            auth::ensure_customer_access(actor, customer_id)?;
            (customer_id, request.agent_id)
        }
        Actor::Agent(id) => {
            if request.agent_id.is_some_and(|agent_id| agent_id != *id) {
                return Err(AuthError::Forbidden(
                    "agents may only register policies they sell".to_string(),
                )
                .into());
            }
            (require_customer_id(request.customer_id)?, Some(*id))
        }
        Actor::Admin(_) | Actor::Employee(_) => {
            (require_customer_id(request.customer_id)?, request.agent_id)
        }
    };

    Ok(PolicyApplication {
        customer_id,
        plan_id: request.plan_id,
        term_years: request.term_years,
        total_investment: request.total_investment,
        payment_interval,
        agent_id,
    })
}

fn require_customer_id(customer_id: Option<CustomerId>) -> Result<CustomerId, ApiError> {
    customer_id.ok_or_else(|| ApiError::BadRequest("customer_id is required".to_string()))
}

/// Registers a new policy starting today
pub async fn create_policy(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreatePolicyRequest>,
) -> Result<(StatusCode, Json<Confirmation<PolicyView>>), ApiError> {
    request.validate()?;
    let application = resolve_application(&actor, request)?;

    let policy = state.engine.create_policy(application).await?;
    let view = PolicyView::new(&policy, state.engine.today());

    Ok((
        StatusCode::CREATED,
        Json(Confirmation::new(
            format!("Policy {} registered", policy.id()),
            view,
        )),
    ))
}

/// Gets a policy with its effective status
pub async fn get_policy(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<PolicyId>,
) -> Result<Json<PolicyView>, ApiError> {
    let view = state.engine.policy_by_id(id).await?;
    auth::ensure_policy_reader(&actor, &view.policy)?;
    Ok(Json(view))
}

/// Quotes the next installment before a charge is started
pub async fn quote_installment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<PolicyId>,
) -> Result<Json<AmountDue>, ApiError> {
    let view = state.engine.policy_by_id(id).await?;
    auth::ensure_policy_owner(&actor, &view.policy)?;
    Ok(Json(state.engine.quote_installment(id).await?))
}

/// Applies a captured charge to the policy
pub async fn confirm_payment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<PolicyId>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<Confirmation<PaymentReceipt>>, ApiError> {
    request.validate()?;
    let view = state.engine.policy_by_id(id).await?;
    auth::ensure_policy_owner(&actor, &view.policy)?;

    let receipt = state.engine.confirm_payment(id, request.into()).await?;
    Ok(Json(Confirmation::new(
        format!("Payment {} recorded", receipt.transaction.id),
        receipt,
    )))
}

/// Lists the policy's transactions, oldest first
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<PolicyId>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let view = state.engine.policy_by_id(id).await?;
    auth::ensure_policy_reader(&actor, &view.policy)?;
    Ok(Json(state.engine.transactions_for_policy(id).await?))
}

/// Lists a customer's policies
pub async fn list_customer_policies(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(customer_id): Path<CustomerId>,
) -> Result<Json<Vec<PolicyView>>, ApiError> {
    auth::ensure_customer_access(&actor, customer_id)?;
    Ok(Json(state.engine.policies_by_customer(customer_id).await?))
}
