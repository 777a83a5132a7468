//! Domain events for the policy aggregate
//!
//! Events record what happened to a policy. They feed the audit log and the
//! customer notifications raised by the lifecycle engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, PolicyId};

/// Domain events emitted by the Policy aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PolicyEvent {
    /// Policy has been issued
    PolicyIssued {
        policy_id: PolicyId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },

    /// An installment has been credited
    InstallmentRecorded {
        policy_id: PolicyId,
        installment: Money,
        total_amount_paid: Money,
        next_payment_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },

    /// Policy reached the end of its term
    PolicyExpired {
        policy_id: PolicyId,
        end_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },

    /// A claim against the policy was approved
    PolicyClaimed {
        policy_id: PolicyId,
        timestamp: DateTime<Utc>,
    },

    /// A withdrawal from the policy was approved
    PolicyCancelled {
        policy_id: PolicyId,
        timestamp: DateTime<Utc>,
    },
}

impl PolicyEvent {
    /// Returns the policy ID associated with this event
    pub fn policy_id(&self) -> PolicyId {
        match self {
            PolicyEvent::PolicyIssued { policy_id, .. }
            | PolicyEvent::InstallmentRecorded { policy_id, .. }
            | PolicyEvent::PolicyExpired { policy_id, .. }
            | PolicyEvent::PolicyClaimed { policy_id, .. }
            | PolicyEvent::PolicyCancelled { policy_id, .. } => *policy_id,
        }
    }

    /// Returns the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            PolicyEvent::PolicyIssued { timestamp, .. }
            | PolicyEvent::InstallmentRecorded { timestamp, .. }
            | PolicyEvent::PolicyExpired { timestamp, .. }
            | PolicyEvent::PolicyClaimed { timestamp, .. }
            | PolicyEvent::PolicyCancelled { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            PolicyEvent::PolicyIssued { .. } => "PolicyIssued",
            PolicyEvent::InstallmentRecorded { .. } => "InstallmentRecorded",
            PolicyEvent::PolicyExpired { .. } => "PolicyExpired",
            PolicyEvent::PolicyClaimed { .. } => "PolicyClaimed",
            PolicyEvent::PolicyCancelled { .. } => "PolicyCancelled",
        }
    }
}
