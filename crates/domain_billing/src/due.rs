//! Amount due for the next installment
//!
//! ```text
//! tax      = installment × tax%
//! penalty  = installment × late%        only when today > next due date
//! total    = round_half_up(installment + tax + penalty, 2)
//! ```
//!
//! Totals under the payable floor are refused so that the gateway is never
//! asked to capture a micro-charge.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, Rate};

use crate::error::BillingError;

/// Smallest total the gateway is asked to capture
pub fn default_minimum_payable() -> Money {
    Money::new(dec!(40.00))
}

/// Breakdown of the amount due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountDue {
    pub installment: Money,
    /// Held to 4 places for display; the total uses the exact figure
    pub tax: Money,
    pub late_penalty: Money,
    /// Rounded to whole cents
    pub total: Money,
    pub overdue: bool,
}

/// Inputs for [`calculate_due`]
#[derive(Debug, Clone, Copy)]
pub struct DueInputs {
    pub installment: Money,
    pub next_payment_date: NaiveDate,
    pub today: NaiveDate,
    pub tax: Rate,
    pub late_penalty: Rate,
    pub minimum_payable: Money,
}

/// Computes the amount a customer must pay for the next installment
pub fn calculate_due(inputs: DueInputs) -> Result<AmountDue, BillingError> {
    let overdue = inputs.today > inputs.next_payment_date;
    let tax = inputs.tax.exact_share(&inputs.installment);
    let late_penalty = if overdue {
        inputs.late_penalty.exact_share(&inputs.installment)
    } else {
        Decimal::ZERO
    };
    // Only the sum of the exact parts is rounded
    let total = Money::from_exact(inputs.installment.amount() + tax + late_penalty);

    if total < inputs.minimum_payable {
        return Err(BillingError::BelowMinimum {
            total,
            minimum: inputs.minimum_payable,
        });
    }

    Ok(AmountDue {
        installment: inputs.installment,
        tax: Money::new(tax),
        late_penalty: Money::new(late_penalty),
        total,
        overdue,
    })
}
