//! Campaign types for the Marketing API.

use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Campaign objective (outcome-driven objectives)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignObjective {
    /// Brand awareness and reach
    OutcomeAwareness,
    /// Engagement
    OutcomeEngagement,
    /// Lead generation
    OutcomeLeads,
    /// Sales and conversions
    OutcomeSales,
    /// Traffic
    OutcomeTraffic,
    /// App installs and engagement
    OutcomeAppPromotion,
}

impl CampaignObjective {
    /// All objectives
    pub const ALL: [CampaignObjective; 6] = [
        Self::OutcomeAwareness,
        Self::OutcomeEngagement,
        Self::OutcomeLeads,
        Self::OutcomeSales,
        Self::OutcomeTraffic,
        Self::OutcomeAppPromotion,
    ];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutcomeAwareness => "OUTCOME_AWARENESS",
            Self::OutcomeEngagement => "OUTCOME_ENGAGEMENT",
            Self::OutcomeLeads => "OUTCOME_LEADS",
            Self::OutcomeSales => "OUTCOME_SALES",
            Self::OutcomeTraffic => "OUTCOME_TRAFFIC",
            Self::OutcomeAppPromotion => "OUTCOME_APP_PROMOTION",
        }
    }
}

impl FromStr for CampaignObjective {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidEnum {
                field: "objective",
                value: s.to_string(),
            })
    }
}

/// Configured campaign status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    /// Delivering
    Active,
    /// Paused by the advertiser
    Paused,
    /// Deleted
    Deleted,
    /// Archived
    Archived,
}

impl CampaignStatus {
    /// All statuses
    pub const ALL: [CampaignStatus; 4] =
        [Self::Active, Self::Paused, Self::Deleted, Self::Archived];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Paused => "PAUSED",
            Self::Deleted => "DELETED",
            Self::Archived => "ARCHIVED",
        }
    }

    /// Statuses a new campaign may be created with
    pub fn is_valid_on_create(&self) -> bool {
        matches!(self, Self::Active | Self::Paused)
    }
}

impl FromStr for CampaignStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidEnum {
                field: "status",
                value: s.to_string(),
            })
    }
}

/// Declared special ad category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialAdCategory {
    /// No special category
    None,
    /// Employment
    Employment,
    /// Housing
    Housing,
    /// Credit
    Credit,
    /// Social issues, elections or politics
    IssuesElectionsPolitics,
    /// Online gambling and gaming
    OnlineGamblingAndGaming,
    /// Financial products and services
    FinancialProductsServices,
}

impl SpecialAdCategory {
    /// All categories
    pub const ALL: [SpecialAdCategory; 7] = [
        Self::None,
        Self::Employment,
        Self::Housing,
        Self::Credit,
        Self::IssuesElectionsPolitics,
        Self::OnlineGamblingAndGaming,
        Self::FinancialProductsServices,
    ];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Employment => "EMPLOYMENT",
            Self::Housing => "HOUSING",
            Self::Credit => "CREDIT",
            Self::IssuesElectionsPolitics => "ISSUES_ELECTIONS_POLITICS",
            Self::OnlineGamblingAndGaming => "ONLINE_GAMBLING_AND_GAMING",
            Self::FinancialProductsServices => "FINANCIAL_PRODUCTS_SERVICES",
        }
    }
}

impl FromStr for SpecialAdCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidEnum {
                field: "special_ad_categories",
                value: s.to_string(),
            })
    }
}

/// Campaign as returned by the Graph API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    /// Campaign ID
    pub id: String,
    /// Name
    #[serde(default)]
    pub name: Option<String>,
    /// Objective
    #[serde(default)]
    pub objective: Option<String>,
    /// Configured status
    #[serde(default)]
    pub status: Option<String>,
    /// Status after account and parent checks
    #[serde(default)]
    pub effective_status: Option<String>,
    /// Daily budget in the account's minor currency unit
    #[serde(default)]
    pub daily_budget: Option<String>,
    /// Lifetime budget in the account's minor currency unit
    #[serde(default)]
    pub lifetime_budget: Option<String>,
    /// Remaining budget
    #[serde(default)]
    pub budget_remaining: Option<String>,
    /// Bid strategy
    #[serde(default)]
    pub bid_strategy: Option<String>,
    /// Declared special ad categories
    #[serde(default)]
    pub special_ad_categories: Vec<String>,
    /// Creation time
    #[serde(default)]
    pub created_time: Option<String>,
    /// Last update time
    #[serde(default)]
    pub updated_time: Option<String>,
    /// Scheduled start
    #[serde(default)]
    pub start_time: Option<String>,
    /// Scheduled stop
    #[serde(default)]
    pub stop_time: Option<String>,
}

impl Campaign {
    /// Parsed configured status
    pub fn status(&self) -> Option<CampaignStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }
}
