//! Endpoint service tests.

use crate::errors::{MetaError, ValidationError};
use crate::fixtures;
use crate::mocks::{MockClientBuilder, MockResponse};
use crate::services::ad_accounts::ListAdAccountsRequest;
use crate::services::campaigns::{CreateCampaignRequest, ListCampaignsRequest, UpdateCampaignRequest};
use crate::services::insights::InsightsRequest;
use crate::services::MetaEndpoints;
use crate::types::{CampaignObjective, CampaignStatus, SpecialAdCategory, TimeIncrement};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;

fn endpoints(responses: Vec<MockResponse>) -> (MetaEndpoints, std::sync::Arc<crate::mocks::MockHttpTransport>) {
    let builder = responses
        .into_iter()
        .fold(MockClientBuilder::new().with_token("EAAB"), |b, r| b.with_response(r));
    let (client, transport) = builder.build().unwrap();
    (MetaEndpoints::new(client), transport)
}

#[tokio::test]
async fn test_get_ad_accounts_defaults() {
    let (api, transport) = endpoints(vec![MockResponse::json(fixtures::ad_accounts_page())]);

    let page = api.get_ad_accounts(ListAdAccountsRequest::new()).await.unwrap();
    assert_eq!(page.data.len(), 2);
    assert!(page.data[0].is_active());
    assert_eq!(page.next_cursor(), Some("QVFIUjZA"));

    let request = transport.last_request().unwrap();
    assert!(request.url.starts_with("https://graph.facebook.com/v19.0/me/adaccounts?"));
    assert_eq!(
        request.query_param("fields").as_deref(),
        Some("id,name,account_status,currency,timezone_name,amount_spent,balance,account_id,business")
    );
    assert_eq!(request.query_param("limit").as_deref(), Some("25"));
}

#[tokio::test]
async fn test_get_ad_accounts_passes_cursor() {
    let (api, transport) = endpoints(vec![MockResponse::json(fixtures::ad_accounts_page())]);

    api.get_ad_accounts(ListAdAccountsRequest::new().after("QVFIUjZA").limit(10))
        .await
        .unwrap();

    let request = transport.last_request().unwrap();
    assert_eq!(request.query_param("after").as_deref(), Some("QVFIUjZA"));
    assert_eq!(request.query_param("limit").as_deref(), Some("10"));
}

#[tokio::test]
async fn test_get_ad_account_normalizes_id() {
    let (api, transport) = endpoints(vec![MockResponse::json(fixtures::ad_account())]);

    let account = api.get_ad_account("1234567890").await.unwrap();
    assert_eq!(account.id, "act_1234567890");
    assert!(transport
        .last_request()
        .unwrap()
        .url
        .starts_with("https://graph.facebook.com/v19.0/act_1234567890?"));
}

#[tokio::test]
async fn test_get_ad_account_rejects_bad_id() {
    let (api, transport) = endpoints(vec![]);

    let err = api.get_ad_account("acct-12").await.unwrap_err();
    assert!(matches!(
        err,
        MetaError::Validation(ValidationError::InvalidAccountId { .. })
    ));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_get_campaigns_status_filter() {
    let (api, transport) = endpoints(vec![MockResponse::json(fixtures::campaigns_page())]);

    let page = api
        .get_campaigns("act_1", ListCampaignsRequest::new().status(["ACTIVE"]))
        .await
        .unwrap();
    assert_eq!(page.data[0].status(), Some(CampaignStatus::Active));

    let request = transport.last_request().unwrap();
    assert!(request
        .url
        .starts_with("https://graph.facebook.com/v19.0/act_1/campaigns?"));
    assert_eq!(
        request.query_param("filtering").as_deref(),
        Some(r#"[{"field":"campaign.delivery_info","operator":"IN","value":["ACTIVE"]}]"#)
    );
}

#[tokio::test]
async fn test_get_campaigns_time_range() {
    let (api, transport) = endpoints(vec![MockResponse::json(fixtures::campaigns_page())]);

    api.get_campaigns(
        "act_1",
        ListCampaignsRequest::new()
            .since(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .until(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()),
    )
    .await
    .unwrap();

    assert_eq!(
        transport.last_request().unwrap().query_param("time_range").as_deref(),
        Some(r#"{"since":"2024-01-01","until":"2024-01-31"}"#)
    );
}

#[tokio::test]
async fn test_get_campaigns_invalid_dates_make_no_call() {
    let (api, transport) = endpoints(vec![]);

    let err = api
        .get_campaigns(
            "act_1",
            ListCampaignsRequest::new()
                .since(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
                .until(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MetaError::Validation(ValidationError::InvalidDateRange { .. })
    ));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_create_campaign() {
    let (api, transport) = endpoints(vec![MockResponse::json(fixtures::created_campaign())]);

    let request = CreateCampaignRequest::new(
        "Spring Sale",
        CampaignObjective::OutcomeSales,
        CampaignStatus::Paused,
    )
    .special_ad_categories(&[SpecialAdCategory::None])
    .daily_budget(5000);
    let created = api.create_campaign("act_1", request).await.unwrap();
    assert_eq!(created.id, "120210000000002");

    let recorded = transport.last_request().unwrap();
    assert_eq!(recorded.method, "POST");
    assert!(recorded.url.starts_with("https://graph.facebook.com/v19.0/act_1/campaigns"));
    let body = recorded.json_body().unwrap();
    assert_eq!(body["objective"], "OUTCOME_SALES");
    assert_eq!(body["special_ad_categories"], json!(["NONE"]));
    assert_eq!(body["daily_budget"], 5000);
}

#[tokio::test]
async fn test_create_campaign_invalid_input_makes_no_call() {
    let (api, transport) = endpoints(vec![]);

    let negative = CreateCampaignRequest::new("x", CampaignObjective::OutcomeSales, CampaignStatus::Paused)
        .daily_budget(-500);
    assert!(api.create_campaign("act_1", negative).await.is_err());

    let mut bad_objective =
        CreateCampaignRequest::new("x", CampaignObjective::OutcomeSales, CampaignStatus::Paused);
    bad_objective.objective = Some("REACH_EVERYONE".to_string());
    assert!(api.create_campaign("act_1", bad_objective).await.is_err());

    let incomplete: CreateCampaignRequest = serde_json::from_value(json!({"name": "x"})).unwrap();
    let err = api.create_campaign("act_1", incomplete).await.unwrap_err();
    assert!(matches!(
        err,
        MetaError::Validation(ValidationError::MissingField { field: "objective" })
    ));

    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_update_and_delete_campaign() {
    let (api, transport) = endpoints(vec![
        MockResponse::json(fixtures::success()),
        MockResponse::json(fixtures::success()),
    ]);

    let result = api
        .update_campaign(
            "120210000000001",
            UpdateCampaignRequest::new().status(CampaignStatus::Paused),
        )
        .await
        .unwrap();
    assert!(result.success);

    api.delete_campaign("120210000000001").await.unwrap();

    let requests = transport.recorded_requests();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].json_body(), Some(json!({"status": "PAUSED"})));
    assert_eq!(requests[1].method, "DELETE");
    assert_eq!(requests[1].url, "https://graph.facebook.com/v19.0/120210000000001");
}

#[tokio::test]
async fn test_update_campaign_propagates_upstream_message() {
    let (api, _) = endpoints(vec![MockResponse::graph_error(
        400,
        "Invalid parameter",
        100,
    )]);

    let err = api
        .update_campaign("1", UpdateCampaignRequest::new().name("Renamed"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid parameter");
}

#[tokio::test]
async fn test_delete_campaign_rejects_bad_id() {
    let (api, transport) = endpoints(vec![]);
    assert!(api.delete_campaign("act_1").await.is_err());
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_campaign_insights_params() {
    let (api, transport) = endpoints(vec![MockResponse::json(fixtures::insights_page())]);

    let page = api
        .get_campaign_insights(
            "120210000000001",
            InsightsRequest::new()
                .since(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
                .until(NaiveDate::from_ymd_opt(2024, 3, 30).unwrap())
                .breakdowns(["age", "gender"])
                .action_breakdowns(["action_type"])
                .time_increment(TimeIncrement::Monthly),
        )
        .await
        .unwrap();
    assert_eq!(page.data[0].clicks.as_deref(), Some("412"));

    let request = transport.last_request().unwrap();
    assert!(request
        .url
        .starts_with("https://graph.facebook.com/v19.0/120210000000001/insights?"));
    assert_eq!(request.query_param("level").as_deref(), Some("campaign"));
    assert_eq!(request.query_param("breakdowns").as_deref(), Some("age,gender"));
    assert_eq!(request.query_param("action_breakdowns").as_deref(), Some("action_type"));
    assert_eq!(request.query_param("time_increment").as_deref(), Some("monthly"));
    assert_eq!(
        request.query_param("time_range").as_deref(),
        Some(r#"{"since":"2024-03-01","until":"2024-03-30"}"#)
    );
}

#[tokio::test]
async fn test_account_insights_default_range() {
    let (api, transport) = endpoints(vec![MockResponse::json(fixtures::insights_page())]);

    api.get_account_insights("act_1", InsightsRequest::new()).await.unwrap();

    let request = transport.last_request().unwrap();
    assert_eq!(request.query_param("level").as_deref(), Some("account"));
    let range: serde_json::Value =
        serde_json::from_str(&request.query_param("time_range").unwrap()).unwrap();
    let since = NaiveDate::parse_from_str(range["since"].as_str().unwrap(), "%Y-%m-%d").unwrap();
    let until = NaiveDate::parse_from_str(range["until"].as_str().unwrap(), "%Y-%m-%d").unwrap();
    assert_eq!((until - since).num_days(), 30);
}

#[tokio::test]
async fn test_batch_campaign_insights_order() {
    let batch = json!([
        {"code": 200, "body": fixtures::insights_page().to_string()},
        {"code": 400, "body": fixtures::graph_error("Unsupported get request", 100).to_string()},
    ]);
    let (api, transport) = endpoints(vec![MockResponse::json(batch)]);

    let ids = vec!["111".to_string(), "222".to_string()];
    let results = api
        .get_batch_campaign_insights(&ids, InsightsRequest::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_success());
    assert_eq!(results[1].code, 400);

    let sent: serde_json::Value =
        serde_json::from_str(&transport.last_request().unwrap().form_field("batch").unwrap())
            .unwrap();
    assert!(sent[0]["relative_url"].as_str().unwrap().starts_with("111/insights?"));
    assert!(sent[1]["relative_url"].as_str().unwrap().starts_with("222/insights?"));
    assert!(sent[1]["relative_url"].as_str().unwrap().contains("level=campaign"));
}

#[tokio::test]
async fn test_batch_campaign_insights_chunks_at_fifty() {
    let (api, transport) = endpoints(vec![
        MockResponse::json(fixtures::batch_insights_response(50)),
        MockResponse::json(fixtures::batch_insights_response(50)),
        MockResponse::json(fixtures::batch_insights_response(20)),
    ]);

    let ids: Vec<String> = (1..=120).map(|i| (1000 + i).to_string()).collect();
    let results = api
        .get_batch_campaign_insights(&ids, InsightsRequest::new())
        .await
        .unwrap();

    assert_eq!(results.len(), 120);
    let requests = transport.recorded_requests();
    assert_eq!(requests.len(), 3);
    let last: serde_json::Value =
        serde_json::from_str(&requests[2].form_field("batch").unwrap()).unwrap();
    assert_eq!(last.as_array().unwrap().len(), 20);
    assert!(last[0]["relative_url"].as_str().unwrap().starts_with("1101/"));
}

#[tokio::test]
async fn test_batch_campaign_insights_empty() {
    let (api, transport) = endpoints(vec![]);
    let results = api
        .get_batch_campaign_insights(&[], InsightsRequest::new())
        .await
        .unwrap();
    assert!(results.is_empty());
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_concurrent_calls_resolve_independently() {
    let (client, transport) = MockClientBuilder::new()
        .with_token("EAAB")
        .build()
        .unwrap();
    let api = MetaEndpoints::new(client);
    transport.push_response(MockResponse::json(fixtures::ad_accounts_page()).with_delay(30));
    transport.push_response(MockResponse::json(fixtures::campaigns_page()).with_delay(20));
    transport.push_response(MockResponse::json(fixtures::insights_page()).with_delay(10));

    let (accounts, campaigns, insights) = futures::join!(
        api.get_ad_accounts(ListAdAccountsRequest::new()),
        api.get_campaigns("act_1", ListCampaignsRequest::new()),
        api.get_campaign_insights("120210000000001", InsightsRequest::new()),
    );

    assert!(accounts.is_ok());
    assert!(campaigns.is_ok());
    assert!(insights.is_ok());
    assert_eq!(transport.request_count(), 3);
}
