//! Campaign service.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};

use super::documents::Document;
use super::{OperationContext, Result, ServiceError};
use crate::core::boards::{BoardService, StageCompletion};
use crate::core::gateway::{call, Envelope, SharedGateway};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub directory_path: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Campaign record, its documents, and board progress.
pub struct CampaignService {
    gateway: SharedGateway,
    boards: Arc<BoardService>,
}

impl CampaignService {
    pub fn new(gateway: SharedGateway, boards: Arc<BoardService>) -> Self {
        Self { gateway, boards }
    }

    #[instrument(skip(self))]
    pub async fn get_campaign(&self, id: i64) -> Result<Campaign> {
        let campaign: Option<Campaign> = call(
            self.gateway.as_ref(),
            "get_campaign",
            &json!({ "id": id }),
            Envelope::Wrapped,
        )
        .await
        .operation("get campaign")?;
        campaign.ok_or(ServiceError::CampaignNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn get_campaign_documents(&self, campaign_id: i64) -> Result<Vec<Document>> {
        let documents: Option<Vec<Document>> = call(
            self.gateway.as_ref(),
            "get_campaign_documents",
            &json!({ "campaignId": campaign_id }),
            Envelope::Wrapped,
        )
        .await
        .operation("get campaign documents")?;
        Ok(documents.unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn create_document_from_template(&self, campaign_id: i64, template_id: &str) -> Result<Document> {
        let document: Document = call(
            self.gateway.as_ref(),
            "create_document_from_template",
            &json!({ "campaignId": campaign_id, "templateId": template_id }),
            Envelope::Wrapped,
        )
        .await
        .operation("create document from template")?;
        info!(document_id = document.id, "created document from template");
        Ok(document)
    }

    /// Template ids of the campaign's completed documents.
    pub async fn completed_template_ids(&self, campaign_id: i64) -> Result<HashSet<String>> {
        Ok(completed_template_ids(&self.get_campaign_documents(campaign_id).await?))
    }

    /// Completion of the campaign's current stage on the campaign board.
    #[instrument(skip(self))]
    pub async fn stage_completion(&self, campaign_id: i64) -> Result<StageCompletion> {
        let campaign = self.get_campaign(campaign_id).await?;
        self.boards.fetch_board_config("campaign").await?;
        let completed = self.completed_template_ids(campaign_id).await?;
        Ok(self
            .boards
            .stage_completion("campaign", &campaign.status, &completed)?)
    }
}

pub fn completed_template_ids(documents: &[Document]) -> HashSet<String> {
    documents
        .iter()
        .filter(|d| d.is_completed())
        .filter_map(|d| d.template_id.clone())
        .collect()
}
