//! Request types for the campaigns service.

use crate::errors::ValidationError;
use crate::services::validation::{
    resolve_date_range, time_range_param, validate_budget, validate_date_range, validate_limit,
    DEFAULT_PAGE_LIMIT,
};
use crate::types::{CampaignObjective, CampaignStatus, Params, SpecialAdCategory};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::str::FromStr;

/// Fields requested when listing campaigns
pub const DEFAULT_CAMPAIGN_FIELDS: &[&str] = &[
    "id",
    "name",
    "objective",
    "status",
    "effective_status",
    "daily_budget",
    "lifetime_budget",
    "budget_remaining",
    "bid_strategy",
    "special_ad_categories",
    "created_time",
    "updated_time",
    "start_time",
    "stop_time",
];

/// Filter field used for delivery status filtering
pub const DELIVERY_FILTER_FIELD: &str = "campaign.delivery_info";

/// Request to list `/{account}/campaigns`
#[derive(Debug, Clone, Default)]
pub struct ListCampaignsRequest {
    /// Delivery statuses to keep; empty means no filter
    pub statuses: Vec<String>,
    /// Range start
    pub since: Option<NaiveDate>,
    /// Range end
    pub until: Option<NaiveDate>,
    /// Fields to return; defaults to [`DEFAULT_CAMPAIGN_FIELDS`]
    pub fields: Option<Vec<String>>,
    /// Page size (1..=500, default 25)
    pub limit: Option<u32>,
    /// Cursor from a previous page
    pub after: Option<String>,
}

impl ListCampaignsRequest {
    /// Create a new request
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by delivery status
    pub fn status<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statuses = statuses.into_iter().map(Into::into).collect();
        self
    }

    /// Set range start
    pub fn since(mut self, date: NaiveDate) -> Self {
        self.since = Some(date);
        self
    }

    /// Set range end
    pub fn until(mut self, date: NaiveDate) -> Self {
        self.until = Some(date);
        self
    }

    /// Set fields
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Set page size
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set cursor
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub(crate) fn to_params(&self, today: NaiveDate) -> Result<Params, ValidationError> {
        validate_date_range(self.since, self.until, today)?;
        let limit = validate_limit(self.limit.unwrap_or(DEFAULT_PAGE_LIMIT))?;

        let fields = match &self.fields {
            Some(fields) if !fields.is_empty() => fields.join(","),
            _ => DEFAULT_CAMPAIGN_FIELDS.join(","),
        };
        let mut params = Params::new().with("fields", fields).with("limit", limit);

        if !self.statuses.is_empty() {
            let filtering = json!([{
                "field": DELIVERY_FILTER_FIELD,
                "operator": "IN",
                "value": self.statuses,
            }]);
            params.insert("filtering", filtering.to_string());
        }

        if self.since.is_some() || self.until.is_some() {
            let (since, until) = resolve_date_range(self.since, self.until, today)?;
            params.insert("time_range", time_range_param(since, until));
        }

        params.insert_opt("after", self.after.clone());
        Ok(params)
    }
}

/// Payload for creating a campaign.
///
/// Fields are optional so payloads deserialized from callers can be
/// checked for completeness before anything is sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateCampaignRequest {
    /// Campaign name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Objective, e.g. `OUTCOME_TRAFFIC`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    /// Initial status, `ACTIVE` or `PAUSED`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Declared special ad categories; may be empty but not absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_ad_categories: Option<Vec<String>>,
    /// Daily budget in minor currency units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<i64>,
    /// Lifetime budget in minor currency units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime_budget: Option<i64>,
    /// Bid strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_strategy: Option<String>,
    /// Start time (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// Stop time (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_time: Option<String>,
}

impl CreateCampaignRequest {
    /// Create a complete request with no special ad categories
    pub fn new(name: impl Into<String>, objective: CampaignObjective, status: CampaignStatus) -> Self {
        Self {
            name: Some(name.into()),
            objective: Some(objective.as_str().to_string()),
            status: Some(status.as_str().to_string()),
            special_ad_categories: Some(Vec::new()),
            ..Default::default()
        }
    }

    /// Set special ad categories
    pub fn special_ad_categories(mut self, categories: &[SpecialAdCategory]) -> Self {
        self.special_ad_categories = Some(categories.iter().map(|c| c.as_str().to_string()).collect());
        self
    }

    /// Set daily budget
    pub fn daily_budget(mut self, amount: i64) -> Self {
        self.daily_budget = Some(amount);
        self
    }

    /// Set lifetime budget
    pub fn lifetime_budget(mut self, amount: i64) -> Self {
        self.lifetime_budget = Some(amount);
        self
    }

    /// Set bid strategy
    pub fn bid_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.bid_strategy = Some(strategy.into());
        self
    }

    /// Check the payload is complete and well-formed
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            return Err(ValidationError::MissingField { field: "name" });
        }
        let objective = self
            .objective
            .as_deref()
            .ok_or(ValidationError::MissingField { field: "objective" })?;
        let status = self
            .status
            .as_deref()
            .ok_or(ValidationError::MissingField { field: "status" })?;
        let categories = self
            .special_ad_categories
            .as_ref()
            .ok_or(ValidationError::MissingField {
                field: "special_ad_categories",
            })?;

        CampaignObjective::from_str(objective)?;
        let status_value = CampaignStatus::from_str(status)?;
        if !status_value.is_valid_on_create() {
            return Err(ValidationError::InvalidEnum {
                field: "status",
                value: status.to_string(),
            });
        }
        for category in categories {
            SpecialAdCategory::from_str(category)?;
        }

        validate_budget("daily_budget", self.daily_budget)?;
        validate_budget("lifetime_budget", self.lifetime_budget)?;
        if self.daily_budget.is_some() && self.lifetime_budget.is_some() {
            return Err(ValidationError::InvalidParameter {
                name: "budget",
                message: "only one of daily_budget and lifetime_budget may be set".to_string(),
            });
        }

        Ok(())
    }

    pub(crate) fn to_body(&self) -> Result<Value, ValidationError> {
        self.validate()?;
        serde_json::to_value(self).map_err(|e| ValidationError::InvalidParameter {
            name: "campaign",
            message: e.to_string(),
        })
    }
}

/// Partial update of a campaign
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateCampaignRequest {
    /// New name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// New daily budget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<i64>,
    /// New lifetime budget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime_budget: Option<i64>,
    /// New bid strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_strategy: Option<String>,
    /// New stop time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_time: Option<String>,
}

impl UpdateCampaignRequest {
    /// Create an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Set name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set status
    pub fn status(mut self, status: CampaignStatus) -> Self {
        self.status = Some(status.as_str().to_string());
        self
    }

    /// Set daily budget
    pub fn daily_budget(mut self, amount: i64) -> Self {
        self.daily_budget = Some(amount);
        self
    }

    /// Set lifetime budget
    pub fn lifetime_budget(mut self, amount: i64) -> Self {
        self.lifetime_budget = Some(amount);
        self
    }

    pub(crate) fn to_body(&self) -> Result<Value, ValidationError> {
        let mut body = Map::new();

        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::InvalidParameter {
                    name: "name",
                    message: "must not be empty".to_string(),
                });
            }
            body.insert("name".into(), json!(name));
        }
        if let Some(status) = &self.status {
            body.insert("status".into(), json!(CampaignStatus::from_str(status)?.as_str()));
        }
        validate_budget("daily_budget", self.daily_budget)?;
        validate_budget("lifetime_budget", self.lifetime_budget)?;
        if let Some(amount) = self.daily_budget {
            body.insert("daily_budget".into(), json!(amount));
        }
        if let Some(amount) = self.lifetime_budget {
            body.insert("lifetime_budget".into(), json!(amount));
        }
        if let Some(strategy) = &self.bid_strategy {
            body.insert("bid_strategy".into(), json!(strategy));
        }
        if let Some(stop) = &self.stop_time {
            body.insert("stop_time".into(), json!(stop));
        }

        if body.is_empty() {
            return Err(ValidationError::InvalidParameter {
                name: "update",
                message: "no fields to update".to_string(),
            });
        }
        Ok(Value::Object(body))
    }
}
