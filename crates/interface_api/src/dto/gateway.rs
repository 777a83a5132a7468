//! Gateway callback DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use core_kernel::{Money, PolicyId};
use domain_billing::CapturedCharge;

/// A charge outcome pushed by the payment gateway
#[derive(Debug, Deserialize, Validate)]
pub struct CaptureNotification {
    #[validate(length(min = 1, max = 255))]
    pub charge_id: String,
    pub policy_id: PolicyId,
    pub amount: Decimal,
    pub succeeded: bool,
    pub captured_at: Option<DateTime<Utc>>,
}

impl CaptureNotification {
    /// Falls back to `now` when the gateway omits the capture time
    pub fn into_charge(self, now: DateTime<Utc>) -> CapturedCharge {
        CapturedCharge {
            charge_id: self.charge_id,
            policy_id: self.policy_id,
            amount: Money::new(self.amount),
            succeeded: self.succeeded,
            captured_at: self.captured_at.unwrap_or(now),
        }
    }
}
