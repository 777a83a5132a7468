//! Party validation rules
//!
//! Field-level rules (name lengths, email format) are declared with
//! `validator` derives on the entities; this module adds the calendar rules
//! that need a reference date.

use chrono::NaiveDate;
use validator::{Validate, ValidationErrors};

use crate::agent::Agent;
use crate::error::PartyError;
use crate::party::Customer;

/// Oldest age accepted on a customer record
pub const MAX_CUSTOMER_AGE: i32 = 150;

/// Validates a customer as of the given date
pub fn validate_customer(customer: &Customer, today: NaiveDate) -> Result<(), PartyError> {
    let mut errors = collect(customer.validate());

    if customer.date_of_birth > today {
        errors.push("date_of_birth: must not be in the future".to_string());
    } else if customer.age_on(today) > MAX_CUSTOMER_AGE {
        errors.push(format!("date_of_birth: age exceeds {MAX_CUSTOMER_AGE} years"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(PartyError::validation_failed(errors))
    }
}

/// Validates an agent record
pub fn validate_agent(agent: &Agent) -> Result<(), PartyError> {
    let errors = collect(agent.validate());
    if errors.is_empty() {
        Ok(())
    } else {
        Err(PartyError::validation_failed(errors))
    }
}

fn collect(result: Result<(), ValidationErrors>) -> Vec<String> {
    let Err(errors) = result else {
        return Vec::new();
    };
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| format!("{field}: {}", e.code))
        })
        .collect();
    messages.sort();
    messages
}
