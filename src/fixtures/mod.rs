//! Test fixtures for Graph API responses.
//!
//! Payloads are shaped like what Meta returns for v19.0.

use serde_json::{json, Value};

/// Successful token exchange
pub fn token_response() -> Value {
    json!({
        "access_token": "EAAGm0PX4ZCpsBAKZ",
        "token_type": "bearer",
        "expires_in": 5183944
    })
}

/// Token exchange that also returns a refresh token
pub fn token_response_with_refresh() -> Value {
    json!({
        "access_token": "EAAGm0PX4ZCpsBArefreshed",
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "rt-9f8e7d"
    })
}

/// Single ad account
pub fn ad_account() -> Value {
    json!({
        "id": "act_1234567890",
        "account_id": "1234567890",
        "name": "Acme Storefront",
        "account_status": 1,
        "currency": "USD",
        "timezone_name": "America/Los_Angeles",
        "amount_spent": "1523400",
        "balance": "0",
        "business": {"id": "998877", "name": "Acme Inc"}
    })
}

/// `/me/adaccounts` page with a next cursor
pub fn ad_accounts_page() -> Value {
    json!({
        "data": [
            ad_account(),
            {
                "id": "act_2233445566",
                "account_id": "2233445566",
                "name": "Acme Outlet",
                "account_status": 2,
                "currency": "EUR",
                "timezone_name": "Europe/Berlin",
                "amount_spent": "0",
                "balance": "0"
            }
        ],
        "paging": {
            "cursors": {"before": "QVFIUmxB", "after": "QVFIUjZA"},
            "next": "https://graph.facebook.com/v19.0/me/adaccounts?after=QVFIUjZA"
        }
    })
}

/// Campaign object
pub fn campaign() -> Value {
    json!({
        "id": "120210000000001",
        "name": "Spring Sale",
        "objective": "OUTCOME_TRAFFIC",
        "status": "ACTIVE",
        "effective_status": "ACTIVE",
        "daily_budget": "5000",
        "budget_remaining": "4200",
        "special_ad_categories": [],
        "created_time": "2024-03-01T10:00:00-0800",
        "start_time": "2024-03-01T10:00:00-0800"
    })
}

/// `/{account}/campaigns` page without further pages
pub fn campaigns_page() -> Value {
    json!({
        "data": [campaign()],
        "paging": {"cursors": {"before": "MAZDZD", "after": "MAZDZD"}}
    })
}

/// Campaign created
pub fn created_campaign() -> Value {
    json!({"id": "120210000000002"})
}

/// `{"success": true}`
pub fn success() -> Value {
    json!({"success": true})
}

/// Insights row
pub fn insight_row() -> Value {
    json!({
        "account_id": "1234567890",
        "campaign_id": "120210000000001",
        "campaign_name": "Spring Sale",
        "impressions": "18234",
        "clicks": "412",
        "spend": "153.27",
        "reach": "15001",
        "ctr": "2.259515",
        "cpc": "0.372015",
        "cpm": "8.405506",
        "actions": [{"action_type": "link_click", "value": "398"}],
        "date_start": "2024-03-01",
        "date_stop": "2024-03-30"
    })
}

/// Insights page
pub fn insights_page() -> Value {
    json!({"data": [insight_row()]})
}

/// Graph error body
pub fn graph_error(message: &str, code: i64) -> Value {
    json!({
        "error": {
            "message": message,
            "type": "OAuthException",
            "code": code,
            "fbtrace_id": "AbCdEf123"
        }
    })
}

/// Batch response entry: `{code, body}` with a JSON-string body
pub fn batch_item(code: u16, body: &Value) -> Value {
    json!({"code": code, "body": body.to_string()})
}

/// Batch response for `n` successful insights calls
pub fn batch_insights_response(n: usize) -> Value {
    Value::Array((0..n).map(|_| batch_item(200, &insights_page())).collect())
}

/// `X-App-Usage` header value
pub fn app_usage_header(pct: u32) -> String {
    json!({"call_count": pct, "total_time": 1, "total_cputime": 1}).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AdAccount, Campaign, InsightRow, Page};

    #[test]
    fn test_fixtures_deserialize() {
        let page: Page<AdAccount> = serde_json::from_value(ad_accounts_page()).unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.next_cursor(), Some("QVFIUjZA"));

        let campaigns: Page<Campaign> = serde_json::from_value(campaigns_page()).unwrap();
        assert!(!campaigns.has_next());

        let insights: Page<InsightRow> = serde_json::from_value(insights_page()).unwrap();
        assert_eq!(insights.data[0].spend_amount(), Some(153.27));
    }

    #[test]
    fn test_batch_fixture_length() {
        assert_eq!(batch_insights_response(3).as_array().unwrap().len(), 3);
    }
}
