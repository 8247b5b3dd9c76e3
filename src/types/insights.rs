//! Insights (reporting) types.

use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Largest day-based `time_increment` Meta accepts
pub const MAX_TIME_INCREMENT_DAYS: u8 = 90;

/// Aggregation period for insights rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeIncrement {
    /// Rows of N days (1..=90)
    Days(u8),
    /// One row per calendar month
    Monthly,
    /// A single row for the whole range
    AllDays,
}

impl TimeIncrement {
    /// One row per day
    pub const DAILY: TimeIncrement = TimeIncrement::Days(1);

    /// Value sent as `time_increment`
    pub fn to_param(&self) -> String {
        match self {
            Self::Days(n) => n.to_string(),
            Self::Monthly => "monthly".to_string(),
            Self::AllDays => "all_days".to_string(),
        }
    }

    /// Check the day count is within range
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Days(n) if *n == 0 || *n > MAX_TIME_INCREMENT_DAYS => {
                Err(ValidationError::InvalidParameter {
                    name: "time_increment",
                    message: format!("must be between 1 and {} days", MAX_TIME_INCREMENT_DAYS),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Action count inside an insights row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionValue {
    /// Action type, e.g. `link_click`
    pub action_type: String,
    /// Count or value as a decimal string
    pub value: String,
}

/// One insights row.
///
/// Breakdown columns (`age`, `gender`, ...) vary per query and land in
/// `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightRow {
    /// Account ID
    #[serde(default)]
    pub account_id: Option<String>,
    /// Campaign ID
    #[serde(default)]
    pub campaign_id: Option<String>,
    /// Campaign name
    #[serde(default)]
    pub campaign_name: Option<String>,
    /// Impressions
    #[serde(default)]
    pub impressions: Option<String>,
    /// Clicks
    #[serde(default)]
    pub clicks: Option<String>,
    /// Spend in account currency
    #[serde(default)]
    pub spend: Option<String>,
    /// Reach
    #[serde(default)]
    pub reach: Option<String>,
    /// Click-through rate
    #[serde(default)]
    pub ctr: Option<String>,
    /// Cost per click
    #[serde(default)]
    pub cpc: Option<String>,
    /// Cost per mille
    #[serde(default)]
    pub cpm: Option<String>,
    /// Actions
    #[serde(default)]
    pub actions: Vec<ActionValue>,
    /// Row start date
    #[serde(default)]
    pub date_start: Option<String>,
    /// Row end date
    #[serde(default)]
    pub date_stop: Option<String>,
    /// Breakdown and other columns
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl InsightRow {
    /// Spend as a number
    pub fn spend_amount(&self) -> Option<f64> {
        self.spend.as_deref().and_then(|s| s.parse().ok())
    }
}
