//! Agent handlers: sold policies, commissions, and withdrawals against them

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use core_kernel::AgentId;
use domain_lifecycle::PolicyView;
use domain_party::Actor;
use domain_policy::{CommissionLine, CommissionSummary};
use domain_withdrawal::WithdrawalRequest;

use crate::auth;
use crate::{error::ApiError, AppState};

pub async fn list_policies(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(agent_id): Path<AgentId>,
) -> Result<Json<Vec<PolicyView>>, ApiError> {
    auth::ensure_agent_access(&actor, agent_id)?;
    Ok(Json(state.engine.policies_by_agent(agent_id).await?))
}

/// One line per policy sold
pub async fn list_commissions(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(agent_id): Path<AgentId>,
) -> Result<Json<Vec<CommissionLine>>, ApiError> {
    auth::ensure_agent_access(&actor, agent_id)?;
    Ok(Json(state.engine.agent_commissions(agent_id).await?))
}

pub async fn commission_summary(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(agent_id): Path<AgentId>,
) -> Result<Json<CommissionSummary>, ApiError> {
    auth::ensure_agent_access(&actor, agent_id)?;
    Ok(Json(state.engine.agent_commission_summary(agent_id).await?))
}

pub async fn list_withdrawals(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(agent_id): Path<AgentId>,
) -> Result<Json<Vec<WithdrawalRequest>>, ApiError> {
    auth::ensure_agent_access(&actor, agent_id)?;
    Ok(Json(state.engine.withdrawals_for_agent(agent_id).await?))
}
