//! Parsing of Meta's usage headers.
//!
//! Graph responses report how much of the app, ad account and business
//! use-case budgets have been consumed, as percentages.

use http::HeaderMap;
use serde_json::Value;
use std::time::Duration;

/// `X-App-Usage`
pub const APP_USAGE_HEADER: &str = "x-app-usage";
/// `X-Ad-Account-Usage`
pub const AD_ACCOUNT_USAGE_HEADER: &str = "x-ad-account-usage";
/// `X-Business-Use-Case-Usage`
pub const BUSINESS_USAGE_HEADER: &str = "x-business-use-case-usage";

/// Percentage at which a warning is logged
pub const USAGE_WARN_PCT: f64 = 80.0;

/// Budget consumption reported by Meta on a response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageReport {
    /// Highest of call_count/total_time/total_cputime in `X-App-Usage`
    pub app_pct: Option<f64>,
    /// `acc_id_util_pct` in `X-Ad-Account-Usage`
    pub account_pct: Option<f64>,
    /// Highest percentage across `X-Business-Use-Case-Usage` entries
    pub business_pct: Option<f64>,
    /// Longest `estimated_time_to_regain_access` (minutes in the header)
    pub regain_access_after: Option<Duration>,
}

impl UsageReport {
    /// Parse usage headers; `None` when none are present or parseable
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let app = header_json(headers, APP_USAGE_HEADER);
        let account = header_json(headers, AD_ACCOUNT_USAGE_HEADER);
        let business = header_json(headers, BUSINESS_USAGE_HEADER);

        if app.is_none() && account.is_none() && business.is_none() {
            return None;
        }

        let mut report = UsageReport {
            app_pct: app.as_ref().and_then(max_pct),
            account_pct: account
                .as_ref()
                .and_then(|v| v.get("acc_id_util_pct"))
                .and_then(Value::as_f64),
            ..Default::default()
        };

        if let Some(Value::Object(map)) = business {
            let entries = map.values().filter_map(Value::as_array).flatten();
            for entry in entries {
                if let Some(pct) = max_pct(entry) {
                    report.business_pct = Some(report.business_pct.map_or(pct, |p| p.max(pct)));
                }
                if let Some(minutes) = entry
                    .get("estimated_time_to_regain_access")
                    .and_then(Value::as_u64)
                    .filter(|m| *m > 0)
                {
                    let wait = Duration::from_secs(minutes.saturating_mul(60));
                    report.regain_access_after =
                        Some(report.regain_access_after.map_or(wait, |w| w.max(wait)));
                }
            }
        }

        Some(report)
    }

    /// Highest reported percentage
    pub fn max_pct(&self) -> f64 {
        [self.app_pct, self.account_pct, self.business_pct]
            .into_iter()
            .flatten()
            .fold(0.0, f64::max)
    }

    /// Whether any budget is fully consumed
    pub fn is_exhausted(&self) -> bool {
        self.max_pct() >= 100.0
    }
}

fn header_json(headers: &HeaderMap, name: &str) -> Option<Value> {
    let raw = headers.get(name)?.to_str().ok()?;
    serde_json::from_str(raw).ok()
}

fn max_pct(value: &Value) -> Option<f64> {
    ["call_count", "total_time", "total_cputime"]
        .iter()
        .filter_map(|k| value.get(*k).and_then(Value::as_f64))
        .reduce(f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_no_headers() {
        assert!(UsageReport::from_headers(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_app_usage() {
        let mut headers = HeaderMap::new();
        headers.insert(
            APP_USAGE_HEADER,
            HeaderValue::from_static(r#"{"call_count":28,"total_time":25,"total_cputime":91}"#),
        );

        let report = UsageReport::from_headers(&headers).unwrap();
        assert_eq!(report.app_pct, Some(91.0));
        assert!(!report.is_exhausted());
    }

    #[test]
    fn test_account_and_business_usage() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AD_ACCOUNT_USAGE_HEADER,
            HeaderValue::from_static(r#"{"acc_id_util_pct":9.67,"reset_time_duration":0}"#),
        );
        headers.insert(
            BUSINESS_USAGE_HEADER,
            HeaderValue::from_static(
                r#"{"1234":[{"type":"ads_management","call_count":100,"total_cputime":20,"total_time":20,"estimated_time_to_regain_access":5}]}"#,
            ),
        );

        let report = UsageReport::from_headers(&headers).unwrap();
        assert_eq!(report.account_pct, Some(9.67));
        assert_eq!(report.business_pct, Some(100.0));
        assert_eq!(report.regain_access_after, Some(Duration::from_secs(300)));
        assert!(report.is_exhausted());
    }

    #[test]
    fn test_huge_regain_estimate_saturates() {
        let mut headers = HeaderMap::new();
        headers.insert(
            BUSINESS_USAGE_HEADER,
            HeaderValue::from_static(
                r#"{"1234":[{"type":"ads_insights","call_count":100,"estimated_time_to_regain_access":18446744073709551615}]}"#,
            ),
        );

        let report = UsageReport::from_headers(&headers).unwrap();
        assert_eq!(report.regain_access_after, Some(Duration::from_secs(u64::MAX)));
    }

    #[test]
    fn test_garbage_header_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(APP_USAGE_HEADER, HeaderValue::from_static("not json"));
        assert!(UsageReport::from_headers(&headers).is_none());
    }
}
