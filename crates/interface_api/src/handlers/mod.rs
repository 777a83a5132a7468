//! Request handlers, one module per area

pub mod agents;
pub mod claims;
pub mod gateway;
pub mod health;
pub mod policy;
pub mod settings;
pub mod withdrawals;
