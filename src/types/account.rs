//! Ad account types.

use serde::{Deserialize, Serialize};

/// Reference to the business that owns an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRef {
    /// Business ID
    pub id: String,
    /// Business name
    #[serde(default)]
    pub name: Option<String>,
}

/// Ad account as returned by the Graph API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdAccount {
    /// Account ID with `act_` prefix
    pub id: String,
    /// Account ID without prefix
    #[serde(default)]
    pub account_id: Option<String>,
    /// Name
    #[serde(default)]
    pub name: Option<String>,
    /// Status code: 1 active, 2 disabled, 3 unsettled, ...
    #[serde(default)]
    pub account_status: Option<i64>,
    /// ISO 4217 currency
    #[serde(default)]
    pub currency: Option<String>,
    /// IANA timezone name
    #[serde(default)]
    pub timezone_name: Option<String>,
    /// Lifetime spend in minor units
    #[serde(default)]
    pub amount_spent: Option<String>,
    /// Outstanding balance in minor units
    #[serde(default)]
    pub balance: Option<String>,
    /// Owning business
    #[serde(default)]
    pub business: Option<BusinessRef>,
}

impl AdAccount {
    /// Whether the account can deliver ads
    pub fn is_active(&self) -> bool {
        self.account_status == Some(1)
    }
}
