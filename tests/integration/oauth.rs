//! Integration tests for the OAuth token endpoint

use super::*;
use meta_business_client::fixtures;
use meta_business_client::MetaError;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::Mock;

#[tokio::test]
async fn test_exchange_code_integration_success() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v19.0/oauth/access_token"))
        .and(body_string_contains("code=abc123"))
        .and(body_string_contains("client_id=123456789"))
        .respond_with(success_response(fixtures::token_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = MetaBusinessClient::new(config_for(&mock_server)).unwrap();
    let tokens = client.exchange_code_for_token("abc123").await.unwrap();

    assert_eq!(tokens.expose(), "EAAGm0PX4ZCpsBAKZ");
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_exchange_code_integration_invalid_code() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v19.0/oauth/access_token"))
        .respond_with(error_response(
            400,
            json!({"error": {"message": "Invalid authorization code"}}),
        ))
        .mount(&mock_server)
        .await;

    let client = MetaBusinessClient::new(config_for(&mock_server)).unwrap();
    let err = client.exchange_code_for_token("nope").await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid authorization code");
    assert!(matches!(err, MetaError::Authentication(_)));
}

#[tokio::test]
async fn test_long_lived_exchange_integration() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v19.0/oauth/access_token"))
        .and(body_string_contains("grant_type=fb_exchange_token"))
        .and(body_string_contains("fb_exchange_token=short-token"))
        .respond_with(success_response(fixtures::token_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = MetaBusinessClient::new(config_for(&mock_server)).unwrap();
    client.exchange_for_long_lived_token("short-token").await.unwrap();
    assert!(client.is_authenticated());
}
