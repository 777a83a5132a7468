//! Insurance agent

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::AgentId;

/// An insurance agent who sells policies on commission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Agent {
    pub id: AgentId,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Agent {
    /// Creates a new active agent
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: AgentId::new_v7(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
