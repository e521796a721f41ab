//! Document service.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::{OperationContext, Result};
use crate::core::gateway::{call, Envelope, Gateway, SharedGateway};

/// A campaign document as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    #[serde(default)]
    pub campaign_id: Option<i64>,
    #[serde(default)]
    pub module_id: Option<i64>,
    #[serde(default)]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub document_type: Option<String>,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl Document {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Fields for `create_document`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentData {
    pub title: String,
    pub content: String,
    pub document_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<i64>,
}

/// Partial metadata for `update_document_metadata`. Unset fields are left
/// untouched by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// Document commands with a list cache keyed by module and campaign.
pub struct DocumentService {
    gateway: SharedGateway,
    cache: RwLock<HashMap<String, Vec<Document>>>,
}

fn list_key(module_id: Option<i64>, campaign_id: Option<i64>) -> String {
    let part = |id: Option<i64>| id.map(|id| id.to_string()).unwrap_or_default();
    format!("{}-{}", part(module_id), part(campaign_id))
}

impl DocumentService {
    pub fn new(gateway: SharedGateway) -> Self {
        Self {
            gateway,
            cache: RwLock::new(HashMap::new()),
        }
    }

    #[instrument(skip(self, data), fields(title = %data.title))]
    pub async fn create(&self, data: &DocumentData) -> Result<Document> {
        let document = self
            .request("create_document", json!({ "request": data }))
            .await
            .operation("create document")?;
        self.clear_cache();
        Ok(document)
    }

    #[instrument(skip(self, content))]
    pub async fn update(&self, id: i64, content: &str) -> Result<Document> {
        let document = self
            .request(
                "update_document",
                json!({ "request": { "document_id": id, "content": content } }),
            )
            .await
            .operation("update document")?;
        self.clear_cache();
        Ok(document)
    }

    #[instrument(skip(self, metadata))]
    pub async fn update_metadata(&self, id: i64, metadata: &DocumentUpdate) -> Result<Document> {
        let mut request = serde_json::to_value(metadata).unwrap_or_else(|_| json!({}));
        if let Value::Object(fields) = &mut request {
            fields.insert("document_id".to_string(), json!(id));
        }
        let document = self
            .request("update_document_metadata", json!({ "request": request }))
            .await
            .operation("update document metadata")?;
        self.clear_cache();
        Ok(document)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.gateway
            .invoke("delete_document", json!({ "request": { "document_id": id } }))
            .await
            .operation("delete document")?;
        self.clear_cache();
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn transition(&self, id: i64, phase: &str) -> Result<Document> {
        let document = self
            .request(
                "transition_document_phase",
                json!({ "request": { "document_id": id, "phase": phase } }),
            )
            .await
            .operation("transition document")?;
        self.clear_cache();
        Ok(document)
    }

    #[instrument(skip(self))]
    pub async fn complete(&self, id: i64) -> Result<Document> {
        let document = self
            .request("complete_document", json!({ "request": { "document_id": id } }))
            .await
            .operation("complete document")?;
        self.clear_cache();
        Ok(document)
    }

    #[instrument(skip(self))]
    pub async fn uncomplete(&self, id: i64) -> Result<Document> {
        let document = self
            .request("uncomplete_document", json!({ "request": { "document_id": id } }))
            .await
            .operation("uncomplete document")?;
        self.clear_cache();
        Ok(document)
    }

    pub async fn validate_exit_criteria(&self, id: i64) -> Result<bool> {
        let valid: Option<bool> = call(
            self.gateway.as_ref(),
            "validate_exit_criteria",
            &json!({ "request": { "document_id": id } }),
            Envelope::Data,
        )
        .await
        .operation("validate exit criteria")?;
        Ok(valid.unwrap_or(false))
    }

    /// Documents for a module and/or campaign, served from cache after the
    /// first fetch.
    #[instrument(skip(self))]
    pub async fn list(&self, module_id: Option<i64>, campaign_id: Option<i64>) -> Result<Vec<Document>> {
        let key = list_key(module_id, campaign_id);
        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(documents) = cached {
            debug!(%key, "document list served from cache");
            return Ok(documents);
        }

        let documents: Option<Vec<Document>> = call(
            self.gateway.as_ref(),
            "list_documents",
            &json!({ "request": { "module_id": module_id, "campaign_id": campaign_id } }),
            Envelope::Data,
        )
        .await
        .operation("list documents")?;
        let documents = documents.unwrap_or_default();

        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, documents.clone());
        Ok(documents)
    }

    pub async fn get_by_type(&self, module_id: Option<i64>, document_type: &str) -> Result<Vec<Document>> {
        Ok(self
            .list(module_id, None)
            .await?
            .into_iter()
            .filter(|d| d.document_type.as_deref() == Some(document_type))
            .collect())
    }

    pub async fn get_by_template(&self, module_id: i64, template_id: &str) -> Result<Option<Document>> {
        Ok(self
            .list(Some(module_id), None)
            .await?
            .into_iter()
            .find(|d| d.template_id.as_deref() == Some(template_id)))
    }

    /// Apply content updates concurrently. Fails on the first rejection.
    pub async fn batch_update(&self, updates: &[(i64, String)]) -> Result<Vec<Document>> {
        let results = try_join_all(
            updates
                .iter()
                .map(|(id, content)| self.update(*id, content)),
        )
        .await?;
        self.clear_cache();
        Ok(results)
    }

    pub fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    async fn request(&self, command: &str, args: Value) -> crate::core::gateway::Result<Document> {
        call(self.gateway.as_ref(), command, &args, Envelope::Data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::campaign::ServiceError;
    use crate::core::gateway::{GatewayError, MemoryGateway};
    use std::sync::Arc;

    fn doc(id: i64, template: &str, doc_type: &str, completed: bool) -> Value {
        let completed_at = if completed { json!("2024-05-01T00:00:00Z") } else { Value::Null };
        json!({
            "id": id,
            "campaign_id": 1,
            "module_id": 3,
            "template_id": template,
            "document_type": doc_type,
            "title": template,
            "completed_at": completed_at,
        })
    }

    fn service(gateway: &MemoryGateway) -> DocumentService {
        DocumentService::new(Arc::new(gateway.clone()))
    }

    #[test]
    fn test_list_key() {
        assert_eq!(list_key(Some(3), None), "3-");
        assert_eq!(list_key(None, Some(1)), "-1");
        assert_eq!(list_key(None, None), "-");
    }

    #[tokio::test]
    async fn test_list_is_cached_until_mutation() {
        let gateway = MemoryGateway::new()
            .with_response(
                "list_documents",
                json!({ "data": [doc(1, "module_overview", "overview", true)] }),
            )
            .with_response(
                "complete_document",
                json!({ "data": doc(1, "module_overview", "overview", true) }),
            );
        let documents = service(&gateway);

        documents.list(Some(3), None).await.unwrap();
        documents.list(Some(3), None).await.unwrap();
        assert_eq!(gateway.call_count("list_documents"), 1);

        documents.complete(1).await.unwrap();
        documents.list(Some(3), None).await.unwrap();
        assert_eq!(gateway.call_count("list_documents"), 2);
    }

    #[tokio::test]
    async fn test_list_args_are_snake_case() {
        let gateway = MemoryGateway::new().with_response("list_documents", json!({ "data": [] }));
        service(&gateway).list(Some(3), Some(1)).await.unwrap();

        let args = gateway.last_args("list_documents").unwrap();
        assert_eq!(args, json!({ "request": { "module_id": 3, "campaign_id": 1 } }));
    }

    #[tokio::test]
    async fn test_get_by_type_and_template() {
        let gateway = MemoryGateway::new().with_response(
            "list_documents",
            json!({ "data": [
                doc(1, "module_overview", "overview", true),
                doc(2, "session_outline", "outline", false),
                doc(3, "clue_tracker", "outline", false),
            ] }),
        );
        let documents = service(&gateway);

        let outlines = documents.get_by_type(Some(3), "outline").await.unwrap();
        assert_eq!(outlines.iter().map(|d| d.id).collect::<Vec<_>>(), vec![2, 3]);

        let found = documents.get_by_template(3, "clue_tracker").await.unwrap();
        assert_eq!(found.map(|d| d.id), Some(3));
        assert!(documents.get_by_template(3, "xp_log").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_metadata_merges_document_id() {
        let gateway = MemoryGateway::new().with_response(
            "update_document_metadata",
            json!({ "data": doc(9, "xp_log", "log", false) }),
        );
        let update = DocumentUpdate {
            title: Some("XP".into()),
            ..Default::default()
        };
        service(&gateway).update_metadata(9, &update).await.unwrap();

        let args = gateway.last_args("update_document_metadata").unwrap();
        assert_eq!(args, json!({ "request": { "title": "XP", "document_id": 9 } }));
    }

    #[tokio::test]
    async fn test_rejection_names_operation() {
        let gateway = MemoryGateway::new().with_failure("delete_document", "document is locked");
        let err = service(&gateway).delete(4).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Gateway { operation: "delete document", source: GatewayError::Transport { .. } }
        ));
    }

    #[tokio::test]
    async fn test_batch_update_runs_every_update() {
        let gateway = MemoryGateway::new().with_handler("update_document", |args| {
            let id = args["request"]["document_id"].as_i64().unwrap_or_default();
            Ok(json!({ "data": { "id": id, "title": "t", "content": args["request"]["content"] } }))
        });
        let updated = service(&gateway)
            .batch_update(&[(1, "a".to_string()), (2, "b".to_string())])
            .await
            .unwrap();

        assert_eq!(updated.len(), 2);
        assert_eq!(updated[1].content.as_deref(), Some("b"));
        assert_eq!(gateway.call_count("update_document"), 2);
    }

    #[tokio::test]
    async fn test_validate_exit_criteria() {
        let gateway = MemoryGateway::new().with_response("validate_exit_criteria", json!({ "data": true }));
        assert!(service(&gateway).validate_exit_criteria(1).await.unwrap());
    }
}
