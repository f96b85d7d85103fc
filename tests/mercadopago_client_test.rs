use mp_checkout::mercadopago::{
    MercadoPagoClient, MercadoPagoConfig, MercadoPagoError, PaymentMethodSource,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, max_retries: u32) -> MercadoPagoClient {
    MercadoPagoClient::new(MercadoPagoConfig {
        access_token: "TEST-token".to_string(),
        base_url: server.uri(),
        timeout_secs: 5,
        max_retries,
    })
    .expect("client init should succeed")
}

#[tokio::test]
async fn payment_methods_are_fetched_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/payment_methods"))
        .and(header("authorization", "Bearer TEST-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "visa", "name": "Visa", "payment_type_id": "credit_card", "status": "active"},
            {"id": "rapipago", "name": "Rapipago", "payment_type_id": "ticket", "status": "active"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let methods = client(&server, 0)
        .payment_methods()
        .await
        .expect("payment methods should load");
    assert_eq!(methods.len(), 2);
    assert_eq!(methods[1].id, "rapipago");
}

#[tokio::test]
async fn create_preference_posts_payload() {
    let server = MockServer::start().await;
    let payload = json!({"items": [], "external_reference": "900"});
    Mock::given(method("POST"))
        .and(path("/checkout/preferences"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "123-abc",
            "init_point": "https://www.mercadopago.com/checkout?pref_id=123-abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server, 0)
        .create_preference(&payload)
        .await
        .expect("preference should be created");
    assert_eq!(response.id, "123-abc");
    assert!(response.sandbox_init_point.is_none());
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/payment_methods"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, 2)
        .payment_methods()
        .await
        .expect_err("401 should fail");
    match err {
        MercadoPagoError::ProviderError {
            status, retryable, ..
        } => {
            assert_eq!(status, Some(401));
            assert!(!retryable);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_is_reported_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/payment_methods"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let err = client(&server, 1)
        .payment_methods()
        .await
        .expect_err("429 should fail");
    assert!(matches!(err, MercadoPagoError::RateLimitError { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn server_error_is_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/payment_methods"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "message": "service unavailable",
            "status": 503
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/payment_methods"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "visa", "name": "Visa", "payment_type_id": "credit_card", "status": "active"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let methods = client(&server, 2)
        .payment_methods()
        .await
        .expect("retry should succeed");
    assert_eq!(methods[0].id, "visa");
}

#[tokio::test]
async fn rate_limit_reports_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/checkout/preferences"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "1")
                .set_body_json(json!({"message": "too many requests", "status": 429})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, 0)
        .create_preference(&json!({"items": []}))
        .await
        .expect_err("429 should fail");
    match err {
        MercadoPagoError::RateLimitError {
            message,
            retry_after_seconds,
        } => {
            assert_eq!(message, "too many requests");
            assert_eq!(retry_after_seconds, Some(1));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
