//! Ad accounts service implementation.

use super::*;
use crate::client::MetaBusinessClient;
use crate::errors::MetaResult;
use crate::services::validation::normalize_account_id;
use crate::types::{AdAccount, Page, RequestOptions};
use async_trait::async_trait;
use tracing::instrument;

/// Trait for ad account operations
#[async_trait]
pub trait AdAccountsServiceTrait: Send + Sync {
    /// List ad accounts of the authenticated user
    async fn list(&self, request: ListAdAccountsRequest) -> MetaResult<Page<AdAccount>>;

    /// Get a single ad account
    async fn get(&self, account_id: &str) -> MetaResult<AdAccount>;
}

/// Ad accounts service implementation
#[derive(Clone)]
pub struct AdAccountsService {
    client: MetaBusinessClient,
}

impl AdAccountsService {
    /// Create a new ad accounts service
    pub fn new(client: MetaBusinessClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AdAccountsServiceTrait for AdAccountsService {
    #[instrument(skip(self), fields(limit = ?request.limit))]
    async fn list(&self, request: ListAdAccountsRequest) -> MetaResult<Page<AdAccount>> {
        let params = request.to_params()?;
        self.client
            .request("/me/adaccounts", RequestOptions::get().params(params))
            .await
    }

    #[instrument(skip(self))]
    async fn get(&self, account_id: &str) -> MetaResult<AdAccount> {
        let account_id = normalize_account_id(account_id)?;
        let options = RequestOptions::get().param("fields", DEFAULT_AD_ACCOUNT_FIELDS.join(","));
        self.client.request(&format!("/{}", account_id), options).await
    }
}
