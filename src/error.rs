//! Crate-level error unifying the module errors.

use crate::config::ConfigError;
use crate::mercadopago::MercadoPagoError;
use crate::mutex::MutexError;
use crate::preference::PreferenceError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Preference(#[from] PreferenceError),

    #[error(transparent)]
    MercadoPago(#[from] MercadoPagoError),

    #[error(transparent)]
    Mutex(#[from] MutexError),
}

impl Error {
    /// Whether the same call may succeed if repeated later.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Preference(err) => err.is_retryable(),
            Error::MercadoPago(err) => err.is_retryable(),
            Error::Config(_) | Error::Mutex(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_is_delegated() {
        let err: Error = MercadoPagoError::NetworkError {
            message: "reset".to_string(),
        }
        .into();
        assert!(err.is_retryable());

        let err: Error = ConfigError::MissingVariable("SHOP_BASE_URL".to_string()).into();
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: SHOP_BASE_URL"
        );
    }
}
