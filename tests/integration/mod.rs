//! Integration tests using WireMock
//!
//! These run the real reqwest transport against a mock Graph API server and
//! cover the full request/response cycle: URL building, bearer auth, form and
//! JSON bodies, error classification and retry.

pub mod endpoints;
pub mod oauth;

use meta_business_client::{MetaBusinessClient, MetaConfig, MetaConfigBuilder};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

/// Helper to start a mock Graph API server
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Configuration pointing at the mock server
pub fn config_for(server: &MockServer) -> MetaConfig {
    MetaConfigBuilder::new()
        .app_id("123456789")
        .app_secret("test-app-secret")
        .redirect_uri("https://example.com/auth/callback")
        .graph_base_url(&server.uri())
        .expect("mock server URI is valid")
        .build()
        .expect("test config is valid")
}

/// Client pointing at the mock server with a stored token
pub fn client_for(server: &MockServer) -> MetaBusinessClient {
    let client = MetaBusinessClient::new(config_for(server)).expect("client builds");
    client.set_access_token("test-token");
    client
}

/// Helper to create an authenticated mock
pub fn mock_with_auth(path_matcher: &str, method_matcher: &str) -> MockBuilder {
    Mock::given(method(method_matcher))
        .and(path(path_matcher))
        .and(header("Authorization", "Bearer test-token"))
}

/// Helper to create error response templates
pub fn error_response(status: u16, error_body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(error_body)
}

/// Helper to create success response templates
pub fn success_response(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}
