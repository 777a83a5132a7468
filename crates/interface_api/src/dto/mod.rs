//! Request and response bodies

pub mod claims;
pub mod gateway;
pub mod policy;
pub mod withdrawals;

use serde::Serialize;

/// Body of a successful mutating call
#[derive(Debug, Serialize)]
pub struct Confirmation<T> {
    pub message: String,
    pub data: T,
}

impl<T> Confirmation<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}
