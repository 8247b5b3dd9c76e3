//! Typed surface over the Marketing API services.

use super::ad_accounts::{AdAccountsService, AdAccountsServiceTrait, ListAdAccountsRequest};
use super::campaigns::{
    CampaignsService, CampaignsServiceTrait, CreateCampaignRequest, ListCampaignsRequest,
    UpdateCampaignRequest,
};
use super::insights::{InsightsRequest, InsightsService, InsightsServiceTrait};
use crate::client::MetaBusinessClient;
use crate::errors::MetaResult;
use crate::types::{
    AdAccount, BatchResponseItem, Campaign, CreatedObject, InsightRow, Page, SuccessResponse,
};

/// Typed operations on ad accounts, campaigns and insights.
///
/// Cheap to clone; every clone shares the client's token, cache and
/// rate budget.
#[derive(Clone)]
pub struct MetaEndpoints {
    client: MetaBusinessClient,
    ad_accounts: AdAccountsService,
    campaigns: CampaignsService,
    insights: InsightsService,
}

impl MetaEndpoints {
    /// Create the endpoints over a client
    pub fn new(client: MetaBusinessClient) -> Self {
        Self {
            ad_accounts: AdAccountsService::new(client.clone()),
            campaigns: CampaignsService::new(client.clone()),
            insights: InsightsService::new(client.clone()),
            client,
        }
    }

    /// Get the underlying client
    pub fn client(&self) -> &MetaBusinessClient {
        &self.client
    }

    /// Get the ad accounts service
    pub fn ad_accounts(&self) -> &AdAccountsService {
        &self.ad_accounts
    }

    /// Get the campaigns service
    pub fn campaigns(&self) -> &CampaignsService {
        &self.campaigns
    }

    /// Get the insights service
    pub fn insights(&self) -> &InsightsService {
        &self.insights
    }

    /// List ad accounts of the authenticated user
    pub async fn get_ad_accounts(&self, request: ListAdAccountsRequest) -> MetaResult<Page<AdAccount>> {
        self.ad_accounts.list(request).await
    }

    /// Get one ad account; bare numeric IDs are prefixed with `act_`
    pub async fn get_ad_account(&self, account_id: &str) -> MetaResult<AdAccount> {
        self.ad_accounts.get(account_id).await
    }

    /// List campaigns of an ad account
    pub async fn get_campaigns(
        &self,
        account_id: &str,
        request: ListCampaignsRequest,
    ) -> MetaResult<Page<Campaign>> {
        self.campaigns.list(account_id, request).await
    }

    /// Create a campaign
    pub async fn create_campaign(
        &self,
        account_id: &str,
        request: CreateCampaignRequest,
    ) -> MetaResult<CreatedObject> {
        self.campaigns.create(account_id, request).await
    }

    /// Update a campaign
    pub async fn update_campaign(
        &self,
        campaign_id: &str,
        request: UpdateCampaignRequest,
    ) -> MetaResult<SuccessResponse> {
        self.campaigns.update(campaign_id, request).await
    }

    /// Delete a campaign
    pub async fn delete_campaign(&self, campaign_id: &str) -> MetaResult<SuccessResponse> {
        self.campaigns.delete(campaign_id).await
    }

    /// Account-level insights
    pub async fn get_account_insights(
        &self,
        account_id: &str,
        request: InsightsRequest,
    ) -> MetaResult<Page<InsightRow>> {
        self.insights.account(account_id, request).await
    }

    /// Campaign-level insights
    pub async fn get_campaign_insights(
        &self,
        campaign_id: &str,
        request: InsightsRequest,
    ) -> MetaResult<Page<InsightRow>> {
        self.insights.campaign(campaign_id, request).await
    }

    /// Campaign insights for many campaigns, one raw item per ID in order
    pub async fn get_batch_campaign_insights(
        &self,
        campaign_ids: &[String],
        request: InsightsRequest,
    ) -> MetaResult<Vec<BatchResponseItem>> {
        self.insights.batch_campaigns(campaign_ids, request).await
    }
}

impl std::fmt::Debug for MetaEndpoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaEndpoints")
            .field("client", &self.client)
            .finish()
    }
}
