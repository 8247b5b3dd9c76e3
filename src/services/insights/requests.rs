//! Request types for the insights service.

use crate::errors::ValidationError;
use crate::services::validation::{resolve_date_range, time_range_param};
use crate::types::{Params, TimeIncrement};
use chrono::NaiveDate;

/// Metrics requested on every insights query
pub const DEFAULT_INSIGHT_FIELDS: &[&str] = &[
    "account_id",
    "campaign_id",
    "campaign_name",
    "impressions",
    "clicks",
    "spend",
    "reach",
    "ctr",
    "cpc",
    "cpm",
    "actions",
];

/// Aggregation level of an insights query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightsLevel {
    /// One row set per ad account
    Account,
    /// One row set per campaign
    Campaign,
}

impl InsightsLevel {
    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Campaign => "campaign",
        }
    }
}

/// Options for an insights query
#[derive(Debug, Clone, Default)]
pub struct InsightsRequest {
    /// Range start; defaults to 30 days before `until`
    pub since: Option<NaiveDate>,
    /// Range end; defaults to today
    pub until: Option<NaiveDate>,
    /// Breakdown dimensions, e.g. `age`, `gender`
    pub breakdowns: Vec<String>,
    /// Action breakdown dimensions, e.g. `action_type`
    pub action_breakdowns: Vec<String>,
    /// Row aggregation period
    pub time_increment: Option<TimeIncrement>,
}

impl InsightsRequest {
    /// Create a request for the last 30 days
    pub fn new() -> Self {
        Self::default()
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

    /// Set breakdowns
    pub fn breakdowns<I, S>(mut self, breakdowns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.breakdowns = breakdowns.into_iter().map(Into::into).collect();
        self
    }

    /// Set action breakdowns
    pub fn action_breakdowns<I, S>(mut self, breakdowns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.action_breakdowns = breakdowns.into_iter().map(Into::into).collect();
        self
    }

    /// Set time increment
    pub fn time_increment(mut self, increment: TimeIncrement) -> Self {
        self.time_increment = Some(increment);
        self
    }

    pub(crate) fn to_params(
        &self,
        level: InsightsLevel,
        today: NaiveDate,
    ) -> Result<Params, ValidationError> {
        let (since, until) = resolve_date_range(self.since, self.until, today)?;

        let mut params = Params::new()
            .with("fields", DEFAULT_INSIGHT_FIELDS.join(","))
            .with("level", level.as_str())
            .with("time_range", time_range_param(since, until));

        if !self.breakdowns.is_empty() {
            params.insert("breakdowns", self.breakdowns.join(","));
        }
        if !self.action_breakdowns.is_empty() {
            params.insert("action_breakdowns", self.action_breakdowns.join(","));
        }
        if let Some(increment) = self.time_increment {
            increment.validate()?;
            params.insert("time_increment", increment.to_param());
        }

        Ok(params)
    }
}
