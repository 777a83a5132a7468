//! Tax and insurance setting snapshots
//!
//! Settings are append-only rows. The current value is the most recently
//! created row; publishing a change appends a new row. A deployment that has
//! never published a row reads every percentage as zero.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{InsuranceSettingId, Rate, TaxSettingId};

use crate::error::BillingError;

/// A tax percentage snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSetting {
    pub id: TaxSettingId,
    pub tax_percentage: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Claim, withdrawal and late-payment percentages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceSetting {
    pub id: InsuranceSettingId,
    pub claim_deduction: Decimal,
    pub withdrawal_penalty: Decimal,
    pub late_penalty: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A tax snapshot waiting to be published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTaxSetting {
    pub tax_percentage: Decimal,
}

impl NewTaxSetting {
    /// Rejects percentages outside 0..=100
    pub fn validate(&self) -> Result<(), BillingError> {
        Rate::checked_percentage(self.tax_percentage)?;
        Ok(())
    }
}

/// An insurance snapshot waiting to be published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInsuranceSetting {
    pub claim_deduction: Decimal,
    pub withdrawal_penalty: Decimal,
    pub late_penalty: Decimal,
}

impl NewInsuranceSetting {
    /// Rejects percentages outside 0..=100
    pub fn validate(&self) -> Result<(), BillingError> {
        Rate::checked_percentage(self.claim_deduction)?;
        Rate::checked_percentage(self.withdrawal_penalty)?;
        Rate::checked_percentage(self.late_penalty)?;
        Ok(())
    }
}

/// The rates in force at one moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    pub tax: Rate,
    pub claim_deduction: Rate,
    pub withdrawal_penalty: Rate,
    pub late_penalty: Rate,
}

impl SettingsSnapshot {
    /// Combines the current rows, reading a missing row as zero rates
    pub fn from_rows(tax: Option<&TaxSetting>, insurance: Option<&InsuranceSetting>) -> Self {
        let mut snapshot = Self::default();
        if let Some(tax) = tax {
            snapshot.tax = Rate::from_percentage(tax.tax_percentage);
        }
        if let Some(insurance) = insurance {
            snapshot.claim_deduction = Rate::from_percentage(insurance.claim_deduction);
            snapshot.withdrawal_penalty = Rate::from_percentage(insurance.withdrawal_penalty);
            snapshot.late_penalty = Rate::from_percentage(insurance.late_penalty);
        }
        snapshot
    }
}
