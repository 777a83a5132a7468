//! Property-Based Test Generators
//!
//! Proptest strategies that produce inputs inside the domain's invariants.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{CustomerId, Money, PolicyId};
use domain_policy::PaymentInterval;

/// Strategy for positive amounts in minor units (paise)
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for positive Money values
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(Money::from_minor)
}

/// Strategy for percentage settings between 0 and 100 with two decimals
pub fn percentage_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..=10_000u32).prop_map(|n| Decimal::new(n as i64, 2))
}

pub fn payment_interval_strategy() -> impl Strategy<Value = PaymentInterval> {
    prop_oneof![
        Just(PaymentInterval::Yearly),
        Just(PaymentInterval::HalfYearly),
        Just(PaymentInterval::Quarterly),
    ]
}

/// Strategy for policy terms in whole years
pub fn term_years_strategy() -> impl Strategy<Value = u32> {
    1u32..=40u32
}

/// Strategy for total investments in whole currency units
pub fn investment_strategy() -> impl Strategy<Value = i64> {
    1_000i64..=10_000_000i64
}

/// Strategy for calendar dates between 2020 and 2039
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..7_300i64).prop_map(|days| {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default() + Duration::days(days)
    })
}

pub fn policy_id_strategy() -> impl Strategy<Value = PolicyId> {
    any::<[u8; 16]>().prop_map(|bytes| PolicyId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

pub fn customer_id_strategy() -> impl Strategy<Value = CustomerId> {
    any::<[u8; 16]>().prop_map(|bytes| CustomerId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}
