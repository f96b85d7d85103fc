//! Application configuration module
//! Handles environment variable loading and validation for the checkout library

use crate::mercadopago::MercadoPagoConfig;
use std::env;
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub lock: LockConfig,
    pub store: StoreConfig,
    pub mercadopago: MercadoPagoConfig,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log format options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Plain,
}

/// Where lock files live
#[derive(Debug, Clone)]
pub struct LockConfig {
    pub directory: PathBuf,
}

/// Storefront URLs used in the preference
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub shop_base_url: String,
    pub notification_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenv::dotenv().ok();

        Ok(AppConfig {
            logging: LoggingConfig::from_env()?,
            lock: LockConfig::from_env(),
            store: StoreConfig::from_env()?,
            mercadopago: MercadoPagoConfig::from_env()
                .map_err(|e| ConfigError::ValidationFailed(e.to_string()))?,
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logging.validate()?;
        self.lock.validate()?;
        self.store.validate()?;
        self.mercadopago
            .validate()
            .map_err(|e| ConfigError::ValidationFailed(e.to_string()))?;

        Ok(())
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "plain".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Plain,
            },
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
        if !valid_levels.contains(&self.level.to_uppercase().as_str()) {
            return Err(ConfigError::InvalidValue("LOG_LEVEL".to_string()));
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            format: LogFormat::Plain,
        }
    }
}

impl LockConfig {
    pub fn from_env() -> Self {
        LockConfig {
            directory: env::var("MP_LOCK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.directory.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue(
                "MP_LOCK_DIR cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(StoreConfig {
            shop_base_url: env::var("SHOP_BASE_URL")
                .map_err(|_| ConfigError::MissingVariable("SHOP_BASE_URL".to_string()))?,
            notification_url: env::var("MERCADOPAGO_NOTIFICATION_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_http_url(&self.shop_base_url) {
            return Err(ConfigError::InvalidValue(
                "SHOP_BASE_URL must be a valid URL".to_string(),
            ));
        }

        if let Some(url) = &self.notification_url {
            // Mercado Pago only delivers notifications over https
            if !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue(
                    "MERCADOPAGO_NOTIFICATION_URL must use https".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),

    #[error("Invalid value for configuration: {0}")]
    InvalidValue(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
