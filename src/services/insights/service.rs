//! Insights service implementation.

use super::*;
use crate::client::MetaBusinessClient;
use crate::errors::MetaResult;
use crate::services::validation::{normalize_account_id, today, validate_object_id};
use crate::types::{BatchRequestItem, BatchResponseItem, InsightRow, Page, RequestOptions, MAX_BATCH_SIZE};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Trait for insights operations
#[async_trait]
pub trait InsightsServiceTrait: Send + Sync {
    /// Account-level insights
    async fn account(&self, account_id: &str, request: InsightsRequest) -> MetaResult<Page<InsightRow>>;

    /// Campaign-level insights
    async fn campaign(&self, campaign_id: &str, request: InsightsRequest) -> MetaResult<Page<InsightRow>>;

    /// Campaign-level insights for many campaigns via batch calls.
    ///
    /// Returns one raw item per ID, in input order.
    async fn batch_campaigns(
        &self,
        campaign_ids: &[String],
        request: InsightsRequest,
    ) -> MetaResult<Vec<BatchResponseItem>>;
}

/// Insights service implementation
#[derive(Clone)]
pub struct InsightsService {
    client: MetaBusinessClient,
}

impl InsightsService {
    /// Create a new insights service
    pub fn new(client: MetaBusinessClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InsightsServiceTrait for InsightsService {
    #[instrument(skip(self, request))]
    async fn account(&self, account_id: &str, request: InsightsRequest) -> MetaResult<Page<InsightRow>> {
        let account_id = normalize_account_id(account_id)?;
        let params = request.to_params(InsightsLevel::Account, today())?;
        self.client
            .request(
                &format!("/{}/insights", account_id),
                RequestOptions::get().params(params),
            )
            .await
    }

    #[instrument(skip(self, request))]
    async fn campaign(&self, campaign_id: &str, request: InsightsRequest) -> MetaResult<Page<InsightRow>> {
        validate_object_id("campaign", campaign_id)?;
        let params = request.to_params(InsightsLevel::Campaign, today())?;
        self.client
            .request(
                &format!("/{}/insights", campaign_id),
                RequestOptions::get().params(params),
            )
            .await
    }

    #[instrument(skip(self, campaign_ids, request), fields(campaigns = campaign_ids.len()))]
    async fn batch_campaigns(
        &self,
        campaign_ids: &[String],
        request: InsightsRequest,
    ) -> MetaResult<Vec<BatchResponseItem>> {
        if campaign_ids.is_empty() {
            return Ok(Vec::new());
        }
        for id in campaign_ids {
            validate_object_id("campaign", id)?;
        }

        let query = request
            .to_params(InsightsLevel::Campaign, today())?
            .to_query_string();
        let items: Vec<BatchRequestItem> = campaign_ids
            .iter()
            .map(|id| BatchRequestItem::get(format!("{}/insights?{}", id, query)))
            .collect();

        let mut results = Vec::with_capacity(items.len());
        for chunk in items.chunks(MAX_BATCH_SIZE) {
            debug!(size = chunk.len(), "Sending insights batch");
            results.extend(self.client.batch_request(chunk).await?);
        }
        Ok(results)
    }
}
