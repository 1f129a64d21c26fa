//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `LAB_MONITOR` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use lab_monitor::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod alerts;
mod auth;
mod database;
mod error;
mod gateway;
mod server;

pub use alerts::AlertsConfig;
pub use auth::{AuthConfig, MIN_PRODUCTION_SECRET_BYTES};
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use gateway::GatewayConfig;
pub use server::{Environment, LogFormat, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration; absent URL selects the in-memory store
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Token verification
    pub auth: AuthConfig,

    /// Room hub queue sizes
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Alert thresholds and recipient directory
    #[serde(default)]
    pub alerts: AlertsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `LAB_MONITOR` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `LAB_MONITOR__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `LAB_MONITOR__AUTH__JWT_SECRET=...` -> `auth.jwt_secret = ...`
    /// - `LAB_MONITOR__ALERTS__TEMPERATURE_HIGH=75` -> `alerts.temperature_high = 75`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("LAB_MONITOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.gateway.validate()?;
        self.alerts.validate()?;
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

    // Env vars are process-global.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("LAB_MONITOR__AUTH__JWT_SECRET", "test-secret");
    }

    fn clear_env() {
        for key in [
            "LAB_MONITOR__AUTH__JWT_SECRET",
            "LAB_MONITOR__SERVER__PORT",
            "LAB_MONITOR__SERVER__ENVIRONMENT",
            "LAB_MONITOR__DATABASE__URL",
            "LAB_MONITOR__ALERTS__TEMPERATURE_HIGH",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.auth.jwt_secret.expose_secret(), "test-secret");
        assert!(config.database.url().is_none());
        assert_eq!(config.server.port, 8080);
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
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("LAB_MONITOR__SERVER__PORT", "3000");
        env::set_var("LAB_MONITOR__ALERTS__TEMPERATURE_HIGH", "75");
        env::set_var("LAB_MONITOR__DATABASE__URL", "postgresql://lab@localhost/lab");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.alerts.temperature_high, 75.0);
        assert_eq!(config.database.url(), Some("postgresql://lab@localhost/lab"));
    }

    #[test]
    fn test_production_requires_long_secret() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("LAB_MONITOR__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(
            config.validate(),
            Err(ValidationError::JwtSecretTooShort(MIN_PRODUCTION_SECRET_BYTES))
        );
    }

    #[test]
    fn test_missing_secret_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }
}
