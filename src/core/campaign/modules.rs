//! Module service.
//!
//! Module records come back from several commands with a varying set of
//! counters. Every response is normalized before it leaves the service:
//! missing counters become zero and a missing module number becomes the
//! module's position (1-based) in its list, or 1 for single records.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use super::documents::Document;
use super::sessions::{normalize_sessions, Session, SessionRecord};
use super::{OperationContext, Result, ServiceError};
use crate::core::boards::BoardConfig;
use crate::core::gateway::{call, Envelope, Gateway, GatewayError, SharedGateway};

/// A module with every counter present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub campaign_id: i64,
    pub module_type: Option<String>,
    pub status: String,
    pub session_count: u32,
    pub module_number: u32,
    pub expected_sessions: u32,
    pub actual_sessions: u32,
    pub sessions_planned: u32,
    pub sessions_completed: u32,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}

/// Module as the backend sends it.
#[derive(Debug, Deserialize)]
struct ModuleRecord {
    id: i64,
    name: String,
    #[serde(default)]
    description: Option<String>,
    campaign_id: i64,
    #[serde(default)]
    module_type: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    session_count: Option<u32>,
    #[serde(default)]
    module_number: Option<u32>,
    #[serde(default)]
    expected_sessions: Option<u32>,
    #[serde(default)]
    actual_sessions: Option<u32>,
    #[serde(default)]
    sessions_planned: Option<u32>,
    #[serde(default)]
    sessions_completed: Option<u32>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    started_at: Option<String>,
    #[serde(default)]
    completed_at: Option<String>,
}

impl ModuleRecord {
    fn normalize(self, default_number: u32) -> Module {
        Module {
            id: self.id,
            name: self.name,
            description: self.description,
            campaign_id: self.campaign_id,
            module_type: self.module_type,
            status: self.status,
            session_count: self.session_count.unwrap_or(0),
            module_number: self.module_number.unwrap_or(default_number),
            expected_sessions: self.expected_sessions.unwrap_or(0),
            actual_sessions: self.actual_sessions.unwrap_or(0),
            sessions_planned: self.sessions_planned.unwrap_or(0),
            sessions_completed: self.sessions_completed.unwrap_or(0),
            created_at: self.created_at,
            updated_at: self.updated_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }
}

/// Fields for `create_module`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewModule {
    pub name: String,
    pub campaign_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Partial fields for `update_module`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Module commands with caches for single modules and campaign lists.
pub struct ModuleService {
    gateway: SharedGateway,
    modules: RwLock<HashMap<i64, Module>>,
    campaign_modules: RwLock<HashMap<i64, Vec<Module>>>,
}

/// Payload of a response that may or may not be wrapped in `{ data }`.
fn unwrap_data(raw: Value) -> Value {
    match raw {
        Value::Object(mut object) if object.contains_key("data") => {
            object.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn decode<T: DeserializeOwned>(command: &str, raw: Value) -> crate::core::gateway::Result<T> {
    serde_json::from_value(unwrap_data(raw)).map_err(|source| GatewayError::DecodeResponse {
        command: command.to_string(),
        source,
    })
}

/// Flatten `fields` into the top-level argument record next to `extra`.
fn merge_args<T: Serialize>(fields: &T, extra: Value) -> Value {
    let mut args = serde_json::to_value(fields).unwrap_or_else(|_| json!({}));
    if let (Value::Object(args), Value::Object(extra)) = (&mut args, extra) {
        args.extend(extra);
    }
    args
}

impl ModuleService {
    pub fn new(gateway: SharedGateway) -> Self {
        Self {
            gateway,
            modules: RwLock::new(HashMap::new()),
            campaign_modules: RwLock::new(HashMap::new()),
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Module> {
        let cached = self
            .modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned();
        if let Some(module) = cached {
            debug!("module served from cache");
            return Ok(module);
        }

        let raw = self
            .gateway
            .invoke("get_module", json!({ "id": id }))
            .await
            .operation("get module")?;
        let record: Option<ModuleRecord> = decode("get_module", raw).operation("get module")?;
        let module = record.ok_or(ServiceError::ModuleNotFound(id))?.normalize(1);
        self.modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, module.clone());
        Ok(module)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, campaign_id: i64) -> Result<Vec<Module>> {
        let cached = self
            .campaign_modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&campaign_id)
            .cloned();
        if let Some(modules) = cached {
            debug!("module list served from cache");
            return Ok(modules);
        }

        let records: Option<Vec<ModuleRecord>> = call(
            self.gateway.as_ref(),
            "list_campaign_modules",
            &json!({ "campaignId": campaign_id }),
            Envelope::Data,
        )
        .await
        .operation("list modules")?;

        let modules: Vec<Module> = records
            .unwrap_or_default()
            .into_iter()
            .zip(1..)
            .map(|(record, number)| record.normalize(number))
            .collect();
        self.campaign_modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(campaign_id, modules.clone());
        Ok(modules)
    }

    #[instrument(skip(self, data), fields(name = %data.name))]
    pub async fn create(&self, data: &NewModule) -> Result<Module> {
        let module = self
            .module_command("create_module", merge_args(data, json!({})))
            .await
            .operation("create module")?;
        self.clear_campaign_cache(data.campaign_id);
        Ok(module)
    }

    #[instrument(skip(self, data))]
    pub async fn update(&self, id: i64, data: &ModuleUpdate) -> Result<Module> {
        let module = self
            .module_command("update_module", merge_args(data, json!({ "id": id })))
            .await
            .operation("update module")?;
        self.forget_module(id);
        if let Some(campaign_id) = data.campaign_id {
            self.clear_campaign_cache(campaign_id);
        }
        Ok(module)
    }

    /// Deletes the module and drops every cache; the owning campaign is
    /// unknown here.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.gateway
            .invoke("delete_module", json!({ "id": id }))
            .await
            .operation("delete module")?;
        self.clear_cache();
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, id: i64, status: &str) -> Result<Module> {
        let module = self
            .module_command("update_module_status", json!({ "moduleId": id, "status": status }))
            .await
            .operation("update module status")?;
        self.forget_module(id);
        Ok(module)
    }

    #[instrument(skip(self))]
    pub async fn transition_stage(&self, id: i64, new_stage: &str) -> Result<Module> {
        let module = self
            .module_command(
                "transition_module_stage",
                json!({ "moduleId": id, "newStage": new_stage }),
            )
            .await
            .operation("transition module stage")?;
        self.forget_module(id);
        Ok(module)
    }

    /// Create the module's stage documents; returns the created paths.
    pub async fn initialize_documents(&self, id: i64) -> Result<Vec<String>> {
        let created: Option<Vec<String>> = call(
            self.gateway.as_ref(),
            "initialize_module_documents",
            &json!({ "moduleId": id }),
            Envelope::Data,
        )
        .await
        .operation("initialize module documents")?;
        Ok(created.unwrap_or_default())
    }

    pub async fn get_documents(&self, id: i64) -> Result<Vec<Document>> {
        let documents: Option<Vec<Document>> = call(
            self.gateway.as_ref(),
            "get_module_documents",
            &json!({ "request": { "module_id": id } }),
            Envelope::Data,
        )
        .await
        .operation("get module documents")?;
        Ok(documents.unwrap_or_default())
    }

    pub async fn list_sessions(&self, id: i64) -> Result<Vec<Session>> {
        let records: Option<Vec<SessionRecord>> = call(
            self.gateway.as_ref(),
            "list_module_sessions",
            &json!({ "request": { "module_id": id } }),
            Envelope::Data,
        )
        .await
        .operation("list module sessions")?;
        Ok(normalize_sessions(records.unwrap_or_default()))
    }

    /// Bump the module's session counter. Failures are logged and dropped.
    #[instrument(skip(self))]
    pub async fn increment_session_count(&self, id: i64) {
        match self
            .gateway
            .invoke("increment_module_sessions", json!({ "moduleId": id }))
            .await
        {
            Ok(_) => self.forget_module(id),
            Err(e) => warn!(error = %e, "failed to increment session count"),
        }
    }

    /// Whether the module's current stage has every completion-gated
    /// required document completed. A stage with nothing to complete never
    /// allows the transition; so does any lookup failure.
    #[instrument(skip(self, board))]
    pub async fn can_transition(&self, id: i64, board: &BoardConfig) -> bool {
        let module = match self.get(id).await {
            Ok(module) => module,
            Err(e) => {
                warn!(error = %e, "cannot evaluate transition");
                return false;
            }
        };
        let documents = match self.get_documents(id).await {
            Ok(documents) => documents,
            Err(e) => {
                warn!(error = %e, "cannot evaluate transition");
                return false;
            }
        };
        let Some(stage) = board.stage(&module.status) else {
            return false;
        };

        let gated: HashSet<&str> = stage
            .required_documents
            .iter()
            .filter(|id| !stage.no_completion_required_documents.contains(id))
            .map(String::as_str)
            .collect();
        let completed: HashSet<&str> = documents
            .iter()
            .filter(|d| d.is_completed())
            .filter_map(|d| d.template_id.as_deref())
            .filter(|id| gated.contains(id))
            .collect();

        !gated.is_empty() && completed.len() == gated.len()
    }

    pub fn clear_cache(&self) {
        self.modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.campaign_modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn forget_module(&self, id: i64) {
        self.modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    fn clear_campaign_cache(&self, campaign_id: i64) {
        self.campaign_modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&campaign_id);
    }

    async fn module_command(&self, command: &str, args: Value) -> crate::core::gateway::Result<Module> {
        let raw = self.gateway.invoke(command, args).await?;
        let record: ModuleRecord = decode(command, raw)?;
        Ok(record.normalize(1))
    }
}
