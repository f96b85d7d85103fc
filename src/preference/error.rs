use crate::mercadopago::error::MercadoPagoError;
use thiserror::Error;

pub type PreferenceResult<T> = Result<T, PreferenceError>;

#[derive(Debug, Clone, Error)]
pub enum PreferenceError {
    #[error("Address not found: {id}")]
    AddressNotFound { id: u64 },

    #[error("Customer group not found: {id}")]
    GroupNotFound { id: u64 },

    #[error("Corrected total unavailable: {message}")]
    Totals { message: String },

    #[error("Payment methods unavailable: {0}")]
    PaymentMethods(#[from] MercadoPagoError),

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Invalid setting {key}: {value}")]
    InvalidSetting { key: String, value: String },
}

impl PreferenceError {
    pub fn is_retryable(&self) -> bool {
        match self {
            PreferenceError::PaymentMethods(err) => err.is_retryable(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for PreferenceError {
    fn from(err: serde_json::Error) -> Self {
        PreferenceError::Serialization {
            message: err.to_string(),
        }
    }
}
