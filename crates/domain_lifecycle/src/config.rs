//! Engine configuration

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::Money;

/// Company name used in customer notifications
pub const DEFAULT_COMPANY_NAME: &str = "SecureLife Insurance";

/// Tunables of the lifecycle engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Smallest amount due the engine will quote
    pub minimum_payable: Money,
    /// Sender name on customer notifications
    pub company_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            minimum_payable: Money::new(dec!(40.00)),
            company_name: DEFAULT_COMPANY_NAME.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_minimum_payable(mut self, minimum: Money) -> Self {
        self.minimum_payable = minimum;
        self
    }

    pub fn with_company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = name.into();
        self
    }
}
