//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `PRICEGUARD` prefix and
//! nested values are separated with a double underscore.
//!
//! # Example
//!
//! ```no_run
//! use priceguard::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod paypal;
mod server;
mod stripe;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use paypal::{PayPalMode, PayPalSettings};
pub use server::{Environment, ServerConfig};
pub use stripe::StripeSettings;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, frontend URL)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Stripe credentials; optional so a dev box can run without them
    #[serde(default)]
    pub stripe: StripeSettings,

    /// PayPal credentials; optional
    #[serde(default)]
    pub paypal: PayPalSettings,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PRICEGUARD` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// - `PRICEGUARD__SERVER__PORT=4000` -> `server.port = 4000`
    /// - `PRICEGUARD__STRIPE__WEBHOOK_SECRET=whsec_...` -> `stripe.webhook_secret`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PRICEGUARD")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.stripe.validate()?;
        self.paypal.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; serialize the tests that touch them.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "PRICEGUARD__DATABASE__URL",
        "PRICEGUARD__SERVER__PORT",
        "PRICEGUARD__SERVER__ENVIRONMENT",
        "PRICEGUARD__STRIPE__API_KEY",
        "PRICEGUARD__STRIPE__WEBHOOK_SECRET",
        "PRICEGUARD__PAYPAL__CLIENT_ID",
        "PRICEGUARD__PAYPAL__CLIENT_SECRET",
        "PRICEGUARD__PAYPAL__MODE",
    ];

    fn set_minimal_env() {
        env::set_var("PRICEGUARD__DATABASE__URL", "postgresql://test@localhost/test");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert!(config.stripe.api_key().is_none());
        assert!(config.paypal.credentials().is_none());
    }

    #[test]
    fn test_validate_minimal_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().validate().is_ok());
    }

    #[test]
    fn test_server_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.environment, Environment::Development);
    }

    #[test]
    fn test_processor_sections() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PRICEGUARD__STRIPE__API_KEY", "sk_test_123");
        env::set_var("PRICEGUARD__STRIPE__WEBHOOK_SECRET", "whsec_abc");
        env::set_var("PRICEGUARD__PAYPAL__CLIENT_ID", "pp-client");
        env::set_var("PRICEGUARD__PAYPAL__CLIENT_SECRET", "pp-secret");
        env::set_var("PRICEGUARD__PAYPAL__MODE", "live");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.stripe.webhook_secret().unwrap().expose_secret(),
            "whsec_abc"
        );
        assert_eq!(config.paypal.mode, PayPalMode::Live);
        assert!(config.paypal.credentials().is_some());
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PRICEGUARD__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn test_missing_database_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_err());
    }
}
