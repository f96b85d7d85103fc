use thiserror::Error;

pub type MercadoPagoResult<T> = Result<T, MercadoPagoError>;

#[derive(Debug, Clone, Error)]
pub enum MercadoPagoError {
    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        field: Option<String>,
    },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimitError {
        message: String,
        retry_after_seconds: Option<u64>,
    },

    #[error("Mercado Pago error: status={status:?}, message={message}")]
    ProviderError {
        message: String,
        status: Option<u16>,
        retryable: bool,
    },
}

impl MercadoPagoError {
    pub fn is_retryable(&self) -> bool {
        match self {
            MercadoPagoError::ValidationError { .. } => false,
            MercadoPagoError::NetworkError { .. } => true,
            MercadoPagoError::RateLimitError { .. } => true,
            MercadoPagoError::ProviderError { retryable, .. } => *retryable,
        }
    }
}
