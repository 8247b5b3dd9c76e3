//! Request types for the ad accounts service.

use crate::errors::ValidationError;
use crate::services::validation::{validate_limit, DEFAULT_PAGE_LIMIT};
use crate::types::Params;

/// Fields requested when the caller does not name any
pub const DEFAULT_AD_ACCOUNT_FIELDS: &[&str] = &[
    "id",
    "name",
    "account_status",
    "currency",
    "timezone_name",
    "amount_spent",
    "balance",
    "account_id",
    "business",
];

/// Request to list `/me/adaccounts`
#[derive(Debug, Clone, Default)]
pub struct ListAdAccountsRequest {
    /// Fields to return; defaults to [`DEFAULT_AD_ACCOUNT_FIELDS`]
    pub fields: Option<Vec<String>>,
    /// Page size (1..=500, default 25)
    pub limit: Option<u32>,
    /// Cursor from a previous page
    pub after: Option<String>,
}

impl ListAdAccountsRequest {
    /// Create a new request
    pub fn new() -> Self {
        Self::default()
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

    pub(crate) fn to_params(&self) -> Result<Params, ValidationError> {
        let limit = validate_limit(self.limit.unwrap_or(DEFAULT_PAGE_LIMIT))?;
        let fields = match &self.fields {
            Some(fields) if !fields.is_empty() => fields.join(","),
            _ => DEFAULT_AD_ACCOUNT_FIELDS.join(","),
        };

        let mut params = Params::new().with("fields", fields).with("limit", limit);
        params.insert_opt("after", self.after.clone());
        Ok(params)
    }
}
