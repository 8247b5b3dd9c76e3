//! Integration tests for typed endpoints

use super::*;
use meta_business_client::fixtures;
use meta_business_client::services::ad_accounts::ListAdAccountsRequest;
use meta_business_client::services::campaigns::{CreateCampaignRequest, ListCampaignsRequest};
use meta_business_client::types::{CampaignObjective, CampaignStatus};
use meta_business_client::{BatchRequestItem, MetaEndpoints, MetaError};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, query_param};
use wiremock::ResponseTemplate;

#[tokio::test]
async fn test_get_ad_accounts_integration() {
    let mock_server = setup_mock_server().await;

    mock_with_auth("/v19.0/me/adaccounts", "GET")
        .and(query_param("limit", "25"))
        .respond_with(success_response(fixtures::ad_accounts_page()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = MetaEndpoints::new(client_for(&mock_server));
    let page = api.get_ad_accounts(ListAdAccountsRequest::new()).await.unwrap();
    // Second read is served from cache; `expect(1)` verifies on drop
    let again = api.get_ad_accounts(ListAdAccountsRequest::new()).await.unwrap();

    assert_eq!(page.data.len(), 2);
    assert_eq!(page, again);
}

#[tokio::test]
async fn test_get_campaigns_filtering_integration() {
    let mock_server = setup_mock_server().await;

    mock_with_auth("/v19.0/act_42/campaigns", "GET")
        .and(query_param(
            "filtering",
            r#"[{"field":"campaign.delivery_info","operator":"IN","value":["ACTIVE","PAUSED"]}]"#,
        ))
        .respond_with(success_response(fixtures::campaigns_page()))
        .mount(&mock_server)
        .await;

    let api = MetaEndpoints::new(client_for(&mock_server));
    let page = api
        .get_campaigns("42", ListCampaignsRequest::new().status(["ACTIVE", "PAUSED"]))
        .await
        .unwrap();
    assert_eq!(page.data.len(), 1);
}

#[tokio::test]
async fn test_create_campaign_integration() {
    let mock_server = setup_mock_server().await;

    mock_with_auth("/v19.0/act_42/campaigns", "POST")
        .and(header("Content-Type", "application/json"))
        .and(body_string_contains("\"objective\":\"OUTCOME_LEADS\""))
        .respond_with(success_response(fixtures::created_campaign()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = MetaEndpoints::new(client_for(&mock_server));
    let created = api
        .create_campaign(
            "act_42",
            CreateCampaignRequest::new("Leads Q3", CampaignObjective::OutcomeLeads, CampaignStatus::Paused),
        )
        .await
        .unwrap();
    assert_eq!(created.id, "120210000000002");
}

#[tokio::test]
async fn test_server_error_retried_integration() {
    let mock_server = setup_mock_server().await;

    mock_with_auth("/v19.0/me", "GET")
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"message": "An unknown error occurred", "code": 1}
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .make_request("/me", meta_business_client::RequestOptions::get())
        .await
        .unwrap_err();
    assert!(matches!(err, MetaError::Server(_)));
    assert_eq!(err.to_string(), "An unknown error occurred");
}

#[tokio::test]
async fn test_expired_session_integration() {
    let mock_server = setup_mock_server().await;

    mock_with_auth("/v19.0/me", "GET")
        .respond_with(error_response(
            401,
            json!({"error": {"message": "Session has expired", "code": 190}}),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let options = meta_business_client::RequestOptions::get;
    assert!(client.make_request("/me", options()).await.is_err());

    let err = client.make_request("/me", options()).await.unwrap_err();
    assert_eq!(err.to_string(), "Access token required");
}

#[tokio::test]
async fn test_batch_integration() {
    let mock_server = setup_mock_server().await;

    mock_with_auth("/v19.0", "POST")
        .and(body_string_contains("batch="))
        .respond_with(success_response(json!([
            {"code": 200, "body": "{\"id\":\"111\"}"},
            {"code": 200, "body": "{\"id\":\"222\"}"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let results = client
        .batch_request(&[BatchRequestItem::get("111"), BatchRequestItem::get("222")])
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[1].body.as_deref(), Some("{\"id\":\"222\"}"));
}
