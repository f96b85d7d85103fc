use crate::mercadopago::error::{MercadoPagoError, MercadoPagoResult};
use crate::mercadopago::provider::PaymentMethodSource;
use crate::mercadopago::types::{PaymentMethodInfo, PreferenceResponse};
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.mercadopago.com";

const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct MercadoPagoConfig {
    pub access_token: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for MercadoPagoConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl MercadoPagoConfig {
    pub fn from_env() -> MercadoPagoResult<Self> {
        let access_token = std::env::var("MERCADOPAGO_ACCESS_TOKEN").map_err(|_| {
            MercadoPagoError::ValidationError {
                message: "MERCADOPAGO_ACCESS_TOKEN environment variable is required".to_string(),
                field: Some("MERCADOPAGO_ACCESS_TOKEN".to_string()),
            }
        })?;

        Ok(Self {
            base_url: std::env::var("MERCADOPAGO_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout_secs: std::env::var("MERCADOPAGO_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
            max_retries: std::env::var("MERCADOPAGO_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(3),
            access_token,
        })
    }

    pub fn validate(&self) -> MercadoPagoResult<()> {
        if self.access_token.trim().is_empty() {
            return Err(MercadoPagoError::ValidationError {
                message: "access token cannot be empty".to_string(),
                field: Some("MERCADOPAGO_ACCESS_TOKEN".to_string()),
            });
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(MercadoPagoError::ValidationError {
                message: "base url must be http(s)".to_string(),
                field: Some("MERCADOPAGO_BASE_URL".to_string()),
            });
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct MercadoPagoClient {
    client: Client,
    config: MercadoPagoConfig,
}

impl MercadoPagoClient {
    pub fn new(config: MercadoPagoConfig) -> MercadoPagoResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MercadoPagoError::NetworkError {
                message: format!("failed to initialize HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> MercadoPagoResult<Self> {
        Self::new(MercadoPagoConfig::from_env()?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Opens a checkout session with the assembled payload.
    pub async fn create_preference(
        &self,
        payload: &JsonValue,
    ) -> MercadoPagoResult<PreferenceResponse> {
        let response: PreferenceResponse = self
            .call(Method::POST, "/checkout/preferences", Some(payload))
            .await?;
        info!(preference_id = %response.id, "mercadopago preference created");
        Ok(response)
    }

    /// Sends the request, retrying on transport errors, 429 and 5xx until
    /// `max_retries` is used up.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&JsonValue>,
    ) -> MercadoPagoResult<T> {
        let url = self.endpoint(path);
        let mut attempt = 0;
        loop {
            match self.attempt(method.clone(), &url, body).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    let delay = match &err {
                        MercadoPagoError::RateLimitError {
                            retry_after_seconds: Some(secs),
                            ..
                        } => Duration::from_secs(*secs).min(MAX_RETRY_AFTER),
                        _ => backoff(attempt),
                    };
                    warn!(
                        path,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "mercadopago call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn attempt<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&JsonValue>,
    ) -> MercadoPagoResult<T> {
        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(&self.config.access_token);
        if let Some(payload) = body {
            request = request.json(payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MercadoPagoError::NetworkError {
                message: format!("mercadopago request failed: {}", e),
            })?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let text = response
            .text()
            .await
            .map_err(|e| MercadoPagoError::NetworkError {
                message: format!("failed to read mercadopago response: {}", e),
            })?;

        if !status.is_success() {
            return Err(status_error(status, retry_after, &text));
        }
        serde_json::from_str::<T>(&text).map_err(|e| MercadoPagoError::ProviderError {
            message: format!("invalid mercadopago JSON response: {}", e),
            status: Some(status.as_u16()),
            retryable: false,
        })
    }
}

#[async_trait]
impl PaymentMethodSource for MercadoPagoClient {
    async fn payment_methods(&self) -> MercadoPagoResult<Vec<PaymentMethodInfo>> {
        self.call(Method::GET, "/v1/payment_methods", None).await
    }
}

/// Maps a non-2xx reply. Mercado Pago error bodies carry a `message` field;
/// anything else is reported verbatim.
fn status_error(status: StatusCode, retry_after: Option<u64>, body: &str) -> MercadoPagoError {
    let message = serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(JsonValue::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string());

    if status == StatusCode::TOO_MANY_REQUESTS {
        return MercadoPagoError::RateLimitError {
            message: if message.is_empty() {
                "mercadopago rate limit exceeded".to_string()
            } else {
                message
            },
            retry_after_seconds: retry_after,
        };
    }
    MercadoPagoError::ProviderError {
        message: format!("HTTP {}: {}", status, message),
        status: Some(status.as_u16()),
        retryable: status.is_server_error(),
    }
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(250 << attempt.min(6))
}
