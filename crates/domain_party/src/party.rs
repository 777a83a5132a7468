//! Parties that act on policies
//!
//! Customers own policies, agents sell them, admins resolve claims and
//! withdrawals, employees assist with back-office reads. Each party kind
//! carries an `active` flag; deactivated parties keep their history but may
//! not initiate or approve anything.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use core_kernel::temporal::age_in_years;
use core_kernel::{AdminId, AgentId, CustomerId, EmployeeId};

use crate::error::PartyError;
use crate::kyc::VerificationStatus;

/// A policyholder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Customer {
    pub id: CustomerId,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub verification_status: VerificationStatus,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Creates a new active customer awaiting verification
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        date_of_birth: NaiveDate,
    ) -> Self {
        Self {
            id: CustomerId::new_v7(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            date_of_birth,
            verification_status: VerificationStatus::Pending,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Sets the verification status
    pub fn with_verification(mut self, status: VerificationStatus) -> Self {
        self.verification_status = status;
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Age in completed years on the given date
    pub fn age_on(&self, date: NaiveDate) -> i32 {
        age_in_years(self.date_of_birth, date)
    }

    pub fn is_verified(&self) -> bool {
        self.verification_status == VerificationStatus::Approved
    }
}

/// A back-office administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub id: AdminId,
    pub name: String,
    pub active: bool,
}

impl Admin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AdminId::new_v7(),
            name: name.into(),
            active: true,
        }
    }
}

/// A back-office employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub active: bool,
}

/// Role granted to an authenticated principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Agent,
    Employee,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Agent => "agent",
            Role::Employee => "employee",
            Role::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "agent" => Ok(Role::Agent),
            "employee" => Ok(Role::Employee),
            "customer" => Ok(Role::Customer),
            other => Err(PartyError::invalid(format!("unknown role {other}"))),
        }
    }
}

/// The principal behind a request
///
/// Resolved from an authenticated subject and role instead of comparing
/// role strings at each call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "lowercase")]
pub enum Actor {
    Admin(AdminId),
    Agent(AgentId),
    Employee(EmployeeId),
    Customer(CustomerId),
}

impl Actor {
    /// Resolves an actor from a role and a subject identifier
    pub fn from_subject(role: Role, subject: &str) -> Result<Self, PartyError> {
        let invalid = |_| PartyError::invalid(format!("invalid {role} subject {subject}"));
        Ok(match role {
            Role::Admin => Actor::Admin(subject.parse().map_err(invalid)?),
            Role::Agent => Actor::Agent(subject.parse().map_err(invalid)?),
            Role::Employee => Actor::Employee(subject.parse().map_err(invalid)?),
            Role::Customer => Actor::Customer(subject.parse().map_err(invalid)?),
        })
    }

    pub fn role(&self) -> Role {
        match self {
            Actor::Admin(_) => Role::Admin,
            Actor::Agent(_) => Role::Agent,
            Actor::Employee(_) => Role::Employee,
            Actor::Customer(_) => Role::Customer,
        }
    }

    pub fn as_customer(&self) -> Option<CustomerId> {
        match self {
            Actor::Customer(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_admin(&self) -> Option<AdminId> {
        match self {
            Actor::Admin(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_agent(&self) -> Option<AgentId> {
        match self {
            Actor::Agent(id) => Some(*id),
            _ => None,
        }
    }

    /// Back-office principals may read any policy
    pub fn is_back_office(&self) -> bool {
        matches!(self, Actor::Admin(_) | Actor::Employee(_))
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Admin(id) => write!(f, "{id}"),
            Actor::Agent(id) => write!(f, "{id}"),
            Actor::Employee(id) => write!(f, "{id}"),
            Actor::Customer(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_from_subject() {
        let id = CustomerId::new();
        let actor = Actor::from_subject(Role::Customer, &id.to_string()).unwrap();
        assert_eq!(actor, Actor::Customer(id));
        assert_eq!(actor.role(), Role::Customer);
        assert_eq!(actor.as_customer(), Some(id));
        assert_eq!(actor.as_admin(), None);
    }

    #[test]
    fn test_actor_rejects_malformed_subject() {
        assert!(Actor::from_subject(Role::Admin, "nobody").is_err());
    }

    #[test]
    fn test_customer_age() {
        let customer = Customer::new(
            "Asha",
            "Rao",
            "asha@example.com",
            NaiveDate::from_ymd_opt(1990, 7, 1).unwrap(),
        );
        assert_eq!(customer.age_on(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()), 34);
        assert!(!customer.is_verified());
    }
}
