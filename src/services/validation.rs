//! Local validation shared by the endpoint services.
//!
//! Everything here runs before a request is built, so a failure never
//! reaches the network.

use crate::errors::ValidationError;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use serde_json::json;

/// Largest page size Meta accepts on list edges
pub const MAX_PAGE_LIMIT: u32 = 500;

/// Default page size
pub const DEFAULT_PAGE_LIMIT: u32 = 25;

/// Days covered by insights queries without an explicit range
pub const DEFAULT_INSIGHTS_DAYS: i64 = 30;

/// Normalize an ad account ID to `act_<digits>`.
///
/// Bare numeric IDs get the prefix added.
pub fn normalize_account_id(id: &str) -> Result<String, ValidationError> {
    let id = id.trim();
    let digits = id.strip_prefix("act_").unwrap_or(id);
    if is_digits(digits) {
        Ok(format!("act_{}", digits))
    } else {
        Err(ValidationError::InvalidAccountId { id: id.to_string() })
    }
}

/// Check that a Graph object ID is a non-empty digit string
pub fn validate_object_id(kind: &'static str, id: &str) -> Result<(), ValidationError> {
    if is_digits(id) {
        Ok(())
    } else {
        Err(ValidationError::InvalidObjectId {
            kind,
            id: id.to_string(),
        })
    }
}

/// Check a page size against Meta's bounds
pub fn validate_limit(limit: u32) -> Result<u32, ValidationError> {
    if (1..=MAX_PAGE_LIMIT).contains(&limit) {
        Ok(limit)
    } else {
        Err(ValidationError::InvalidParameter {
            name: "limit",
            message: format!("must be between 1 and {}", MAX_PAGE_LIMIT),
        })
    }
}

/// Reject negative budgets; Meta expects minor currency units
pub fn validate_budget(field: &'static str, value: Option<i64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v < 0 => Err(ValidationError::NegativeBudget { field }),
        _ => Ok(()),
    }
}

/// Check an explicit date range relative to `today`.
///
/// `since` may not be after `until`, and may not be in the future.
pub fn validate_date_range(
    since: Option<NaiveDate>,
    until: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    if let Some(since) = since {
        if since > today {
            return Err(ValidationError::InvalidDateRange {
                message: format!("since {} is in the future", since),
            });
        }
    }
    if let (Some(since), Some(until)) = (since, until) {
        if since > until {
            return Err(ValidationError::InvalidDateRange {
                message: format!("since {} is after until {}", since, until),
            });
        }
    }
    Ok(())
}

/// Resolve an optional range, defaulting to the last 30 days ending `today`
pub fn resolve_date_range(
    since: Option<NaiveDate>,
    until: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    validate_date_range(since, until, today)?;
    let until = until.unwrap_or(today);
    let since = match since {
        Some(since) => since,
        None => {
            let since = until
                .checked_sub_signed(ChronoDuration::days(DEFAULT_INSIGHTS_DAYS))
                .ok_or_else(|| ValidationError::InvalidDateRange {
                    message: format!("until {} is out of range", until),
                })?;
            if since > today {
                return Err(ValidationError::InvalidDateRange {
                    message: format!(
                        "until {} is more than {} days in the future; set since explicitly",
                        until, DEFAULT_INSIGHTS_DAYS
                    ),
                });
            }
            since
        }
    };
    Ok((since, until))
}

/// Today's date in UTC
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// `time_range` parameter value: `{"since":"YYYY-MM-DD","until":"YYYY-MM-DD"}`
pub fn time_range_param(since: NaiveDate, until: NaiveDate) -> String {
    json!({
        "since": since.format("%Y-%m-%d").to_string(),
        "until": until.format("%Y-%m-%d").to_string(),
    })
    .to_string()
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
