//! API configuration

use serde::Deserialize;

use core_kernel::Timezone;

/// Placeholder secret used when none is configured
pub const PLACEHOLDER_SECRET: &str = "change-me-in-production";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Log level
    pub log_level: String,
    pub log_format: LogFormat,
    /// Timezone in which "today" is evaluated
    pub business_timezone: Timezone,
    /// Shared secret the payment gateway presents on capture callbacks
    pub gateway_webhook_secret: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: PLACEHOLDER_SECRET.to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/lifecycle".to_string(),
            db_max_connections: 10,
            log_level: "info".to_string(),
            log_format: LogFormat::Plain,
            business_timezone: Timezone::default(),
            gateway_webhook_secret: PLACEHOLDER_SECRET.to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables over the defaults
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("jwt_expiration_secs", defaults.jwt_expiration_secs.to_string())?
            .set_default("database_url", defaults.database_url)?
            .set_default("db_max_connections", i64::from(defaults.db_max_connections))?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", "plain")?
            .set_default("business_timezone", "Asia/Kolkata")?
            .set_default("gateway_webhook_secret", defaults.gateway_webhook_secret)?
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Names of the secrets still set to the placeholder
    pub fn placeholder_secrets(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.jwt_secret == PLACEHOLDER_SECRET {
            names.push("API_JWT_SECRET");
        }
        if self.gateway_webhook_secret == PLACEHOLDER_SECRET {
            names.push("API_GATEWAY_WEBHOOK_SECRET");
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_business_timezone() {
        let config = ApiConfig::default();
        assert_eq!(config.business_timezone, Timezone::default());
        assert_eq!(config.log_format, LogFormat::Plain);
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_placeholder_secrets_are_reported() {
        let mut config = ApiConfig::default();
        assert_eq!(
            config.placeholder_secrets(),
            vec!["API_JWT_SECRET", "API_GATEWAY_WEBHOOK_SECRET"]
        );

        config.gateway_webhook_secret = "whsec_live".to_string();
        assert_eq!(config.placeholder_secrets(), vec!["API_JWT_SECRET"]);

        config.jwt_secret = "jwt_live".to_string();
        assert!(config.placeholder_secrets().is_empty());
    }
}
