//! Authentication and authorization
//!
//! Tokens carry the principal's role and subject id. The auth middleware
//! resolves them into an [`Actor`]; the guards below check roles and
//! ownership before a handler reaches the engine.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{AdminId, AgentId, CustomerId};
use domain_party::{Actor, Role};
use domain_policy::PolicyRecord;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the party id)
    pub sub: String,
    pub role: Role,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    /// Resolves the principal behind the token
    pub fn actor(&self) -> Result<Actor, AuthError> {
        Actor::from_subject(self.role, &self.sub).map_err(|_| AuthError::InvalidSubject)
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token subject does not match its role")]
    InvalidSubject,
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

/// Creates a signed token for an actor
pub fn create_token(actor: &Actor, secret: &str, expiration_secs: u64) -> Result<String, AuthError> {
    let now = Utc::now();
    let lifetime = i64::try_from(expiration_secs).map_err(|_| AuthError::InvalidToken)?;
    let exp = now + Duration::seconds(lifetime);

    let claims = Claims {
        sub: actor.to_string(),
        role: actor.role(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

pub fn require_admin(actor: &Actor) -> Result<AdminId, AuthError> {
    actor
        .as_admin()
        .ok_or_else(|| AuthError::Forbidden(format!("{} may not perform admin actions", actor.role())))
}

pub fn require_customer(actor: &Actor) -> Result<CustomerId, AuthError> {
    actor
        .as_customer()
        .ok_or_else(|| AuthError::Forbidden("only customers may do this".to_string()))
}

pub fn require_back_office(actor: &Actor) -> Result<(), AuthError> {
    if actor.is_back_office() {
        Ok(())
    } else {
        Err(AuthError::Forbidden("back office only".to_string()))
    }
}

/// The customer themself or back office
pub fn ensure_customer_access(actor: &Actor, customer_id: CustomerId) -> Result<(), AuthError> {
    if actor.is_back_office() || actor.as_customer() == Some(customer_id) {
        Ok(())
    } else {
        Err(AuthError::Forbidden(format!("no access to customer {customer_id}")))
    }
}

/// The agent themself or back office
pub fn ensure_agent_access(actor: &Actor, agent_id: AgentId) -> Result<(), AuthError> {
    if actor.is_back_office() || actor.as_agent() == Some(agent_id) {
        Ok(())
    } else {
        Err(AuthError::Forbidden(format!("no access to agent {agent_id}")))
    }
}

/// Quotes and payments: the owning customer or back office
pub fn ensure_policy_owner(actor: &Actor, policy: &PolicyRecord) -> Result<(), AuthError> {
    ensure_customer_access(actor, policy.customer_id)
        .map_err(|_| AuthError::Forbidden(format!("{} does not own policy {}", actor, policy.id)))
}

/// Reads: additionally the selling agent
pub fn ensure_policy_reader(actor: &Actor, policy: &PolicyRecord) -> Result<(), AuthError> {
    let sold_it = policy.agent_id.is_some() && actor.as_agent() == policy.agent_id;
    if sold_it {
        return Ok(());
    }
    ensure_policy_owner(actor, policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trips_to_actor() {
        let actor = Actor::Customer(CustomerId::new());
        let token = create_token(&actor, SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();
        assert_eq!(claims.role, Role::Customer);
        assert_eq!(claims.actor().unwrap(), actor);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token(&Actor::Admin(AdminId::new()), SECRET, 60).unwrap();
        assert!(matches!(validate_token(&token, "other"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_mismatched_role_and_subject() {
        let claims = Claims {
            sub: "not-an-id".to_string(),
            role: Role::Admin,
            exp: 0,
            iat: 0,
        };
        assert!(matches!(claims.actor(), Err(AuthError::InvalidSubject)));
    }

    #[test]
    fn test_role_guards() {
        let admin = Actor::Admin(AdminId::new());
        let customer_id = CustomerId::new();
        let customer = Actor::Customer(customer_id);

        assert!(require_admin(&admin).is_ok());
        assert!(require_admin(&customer).is_err());
        assert_eq!(require_customer(&customer).unwrap(), customer_id);
        assert!(ensure_customer_access(&admin, customer_id).is_ok());
        assert!(ensure_customer_access(&Actor::Customer(CustomerId::new()), customer_id).is_err());
        assert!(ensure_agent_access(&customer, AgentId::new()).is_err());
    }
}
