//! Billing Domain Ports

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PortError};

use crate::settings::{InsuranceSetting, NewInsuranceSetting, NewTaxSetting, TaxSetting};

/// Append-only store of setting snapshots
///
/// The current setting is the most recently created row.
#[async_trait]
pub trait SettingsPort: DomainPort + HealthCheckable {
    /// The latest tax snapshot, if any has been published
    async fn current_tax_setting(&self) -> Result<Option<TaxSetting>, PortError>;

    /// The latest insurance snapshot, if any has been published
    async fn current_insurance_setting(&self) -> Result<Option<InsuranceSetting>, PortError>;

    /// Appends a new tax snapshot
    async fn publish_tax_setting(&self, setting: NewTaxSetting) -> Result<TaxSetting, PortError>;

    /// Appends a new insurance snapshot
    async fn publish_insurance_setting(
        &self,
        setting: NewInsuranceSetting,
    ) -> Result<InsuranceSetting, PortError>;
}

/// Mock implementation of SettingsPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{HealthCheckResult, InsuranceSettingId, TaxSettingId};

    /// In-memory setting history; reads can be switched off to simulate an outage
    #[derive(Debug, Default, Clone)]
    pub struct MockSettingsPort {
        tax: Arc<RwLock<Vec<TaxSetting>>>,
        insurance: Arc<RwLock<Vec<InsuranceSetting>>>,
        unavailable: Arc<AtomicBool>,
    }

    impl MockSettingsPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// While set, every read of the current settings fails
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        fn ensure_available(&self) -> Result<(), PortError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(PortError::connection("settings store unreachable"));
            }
            Ok(())
        }
    }

    impl DomainPort for MockSettingsPort {}

    #[async_trait]
    impl HealthCheckable for MockSettingsPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-settings-port")
        }
    }

    #[async_trait]
    impl SettingsPort for MockSettingsPort {
        async fn current_tax_setting(&self) -> Result<Option<TaxSetting>, PortError> {
            self.ensure_available()?;
            Ok(self.tax.read().await.last().cloned())
        }

        async fn current_insurance_setting(&self) -> Result<Option<InsuranceSetting>, PortError> {
            self.ensure_available()?;
            Ok(self.insurance.read().await.last().cloned())
        }

        async fn publish_tax_setting(&self, setting: NewTaxSetting) -> Result<TaxSetting, PortError> {
            let mut rows = self.tax.write().await;
            let row = TaxSetting {
                id: TaxSettingId::new(rows.len() as i64 + 1),
                tax_percentage: setting.tax_percentage,
                created_at: Utc::now(),
            };
            rows.push(row.clone());
            Ok(row)
        }

        async fn publish_insurance_setting(
            &self,
            setting: NewInsuranceSetting,
        ) -> Result<InsuranceSetting, PortError> {
            let mut rows = self.insurance.write().await;
            let row = InsuranceSetting {
                id: InsuranceSettingId::new(rows.len() as i64 + 1),
                claim_deduction: setting.claim_deduction,
                withdrawal_penalty: setting.withdrawal_penalty,
                late_penalty: setting.late_penalty,
                created_at: Utc::now(),
            };
            rows.push(row.clone());
            Ok(row)
        }
    }
}
