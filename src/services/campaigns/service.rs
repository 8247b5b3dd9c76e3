//! Campaigns service implementation.

use super::*;
use crate::client::MetaBusinessClient;
use crate::errors::MetaResult;
use crate::services::validation::{normalize_account_id, today, validate_object_id};
use crate::types::{Campaign, CreatedObject, Page, RequestOptions, SuccessResponse};
use async_trait::async_trait;
use tracing::{info, instrument};

/// Trait for campaign operations
#[async_trait]
pub trait CampaignsServiceTrait: Send + Sync {
    /// List campaigns of an ad account
    async fn list(&self, account_id: &str, request: ListCampaignsRequest) -> MetaResult<Page<Campaign>>;

    /// Create a campaign under an ad account
    async fn create(&self, account_id: &str, request: CreateCampaignRequest) -> MetaResult<CreatedObject>;

    /// Update a campaign
    async fn update(&self, campaign_id: &str, request: UpdateCampaignRequest) -> MetaResult<SuccessResponse>;

    /// Delete a campaign
    async fn delete(&self, campaign_id: &str) -> MetaResult<SuccessResponse>;
}

/// Campaigns service implementation
#[derive(Clone)]
pub struct CampaignsService {
    client: MetaBusinessClient,
}

impl CampaignsService {
    /// Create a new campaigns service
    pub fn new(client: MetaBusinessClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CampaignsServiceTrait for CampaignsService {
    #[instrument(skip(self, request), fields(statuses = request.statuses.len()))]
    async fn list(&self, account_id: &str, request: ListCampaignsRequest) -> MetaResult<Page<Campaign>> {
        let account_id = normalize_account_id(account_id)?;
        let params = request.to_params(today())?;
        self.client
            .request(
                &format!("/{}/campaigns", account_id),
                RequestOptions::get().params(params),
            )
            .await
    }

    #[instrument(skip(self, request), fields(name = ?request.name))]
    async fn create(&self, account_id: &str, request: CreateCampaignRequest) -> MetaResult<CreatedObject> {
        let account_id = normalize_account_id(account_id)?;
        let body = request.to_body()?;
        let created: CreatedObject = self
            .client
            .request(&format!("/{}/campaigns", account_id), RequestOptions::post(body))
            .await?;
        info!(campaign_id = %created.id, "Campaign created");
        Ok(created)
    }

    #[instrument(skip(self, request))]
    async fn update(&self, campaign_id: &str, request: UpdateCampaignRequest) -> MetaResult<SuccessResponse> {
        validate_object_id("campaign", campaign_id)?;
        let body = request.to_body()?;
        self.client
            .request(&format!("/{}", campaign_id), RequestOptions::post(body))
            .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, campaign_id: &str) -> MetaResult<SuccessResponse> {
        validate_object_id("campaign", campaign_id)?;
        self.client
            .request(&format!("/{}", campaign_id), RequestOptions::delete())
            .await
    }
}
