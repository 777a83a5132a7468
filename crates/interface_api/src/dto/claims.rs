//! Claim DTOs

use serde::Deserialize;
use validator::Validate;

use core_kernel::{DocumentId, PolicyId};
use domain_lifecycle::ClaimSubmission;

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitClaimRequest {
    pub policy_id: PolicyId,
    #[validate(length(min = 1, max = 4000))]
    pub explanation: String,
    #[serde(default)]
    pub document_ids: Vec<DocumentId>,
}

impl From<SubmitClaimRequest> for ClaimSubmission {
    fn from(request: SubmitClaimRequest) -> Self {
        ClaimSubmission {
            policy_id: request.policy_id,
            explanation: request.explanation,
            document_ids: request.document_ids,
        }
    }
}
