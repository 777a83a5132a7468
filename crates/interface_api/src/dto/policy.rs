//! Policy DTOs

use serde::Deserialize;
use validator::Validate;

use core_kernel::{AgentId, CustomerId, PlanId};
use domain_billing::ChargeConfirmation;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePolicyRequest {
    /// Defaults to the calling customer
    pub customer_id: Option<CustomerId>,
    pub plan_id: PlanId,
    #[validate(range(min = 1, max = 100))]
    pub term_years: u32,
    /// Whole currency units
    #[validate(range(min = 1))]
    pub total_investment: i64,
    /// One of YEARLY, HALF_YEARLY, QUARTERLY
    pub payment_interval: String,
    pub agent_id: Option<AgentId>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PaymentRequest {
    /// Charge id returned by the gateway
    #[validate(length(min = 1, max = 255))]
    pub charge_id: String,
}

impl From<PaymentRequest> for ChargeConfirmation {
    fn from(request: PaymentRequest) -> Self {
        ChargeConfirmation {
            charge_id: request.charge_id,
        }
    }
}
