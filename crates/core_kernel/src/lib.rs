//! Core Kernel - Foundational types and utilities for the policy lifecycle
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money and percentage rates with precise decimal arithmetic
//! - Calendar arithmetic and an injectable business clock
//! - Strongly-typed identifiers
//! - Port infrastructure shared by every adapter

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{Money, MoneyError, Rate};
pub use temporal::{Clock, FixedClock, SystemClock, Timezone, TemporalError};
pub use identifiers::{
    PolicyId, PlanId, SchemeId, TransactionId, TaxSettingId, InsuranceSettingId,
    ClaimId, WithdrawalId, DocumentId, CustomerId, AgentId, AdminId, EmployeeId,
};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
