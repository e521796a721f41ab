//! Session list for one module.
//!
//! Holds the module's sessions after [`SessionService::load`] and keeps the
//! list in step with every mutation. Loading is fail-soft (an error string
//! plus an empty list); mutations also record the error but hand it back to
//! the caller.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::modules::ModuleService;
use super::{OperationContext, Result};
use crate::core::gateway::{call, Envelope, Gateway, SharedGateway};

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_PLANNED: &str = "planned";
pub const STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub module_id: i64,
    pub name: Option<String>,
    pub status: String,
    pub session_number: u32,
    pub scheduled_date: Option<String>,
    pub actual_date: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub completed_at: Option<String>,
}

/// Session as the backend sends it.
#[derive(Debug, Deserialize)]
pub(super) struct SessionRecord {
    id: i64,
    module_id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    session_number: Option<u32>,
    #[serde(default)]
    scheduled_date: Option<String>,
    #[serde(default)]
    actual_date: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    completed_at: Option<String>,
}

impl SessionRecord {
    fn normalize(self, default_number: u32) -> Session {
        Session {
            id: self.id,
            module_id: self.module_id,
            name: self.name,
            status: self.status,
            session_number: self.session_number.unwrap_or(default_number),
            scheduled_date: self.scheduled_date,
            actual_date: self.actual_date,
            notes: self.notes,
            created_at: self
                .created_at
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
            updated_at: self.updated_at,
            completed_at: self.completed_at,
        }
    }
}

/// Number sessions missing one by their 1-based list position.
pub(super) fn normalize_sessions(records: Vec<SessionRecord>) -> Vec<Session> {
    records
        .into_iter()
        .zip(1..)
        .map(|(record, number)| record.normalize(number))
        .collect()
}

/// Fields the backend needs to create a session on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    pub campaign_id: i64,
    pub campaign_directory: String,
    pub module_number: u32,
}

/// Partial fields for `update_session`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Default)]
struct SessionState {
    sessions: Vec<Session>,
    error: Option<String>,
    loading: bool,
}

/// Sessions of one module.
pub struct SessionService {
    gateway: SharedGateway,
    module_id: i64,
    modules: Option<Arc<ModuleService>>,
    state: RwLock<SessionState>,
}

impl SessionService {
    pub fn new(gateway: SharedGateway, module_id: i64) -> Self {
        Self {
            gateway,
            module_id,
            modules: None,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Route session-count increments through `modules` so its cached
    /// module is invalidated.
    pub fn with_module_service(mut self, modules: Arc<ModuleService>) -> Self {
        self.modules = Some(modules);
        self
    }

    pub fn module_id(&self) -> i64 {
        self.module_id
    }

    /// Replace the held list with the module's sessions. On failure the
    /// list is emptied and [`error`](Self::error) is set.
    #[instrument(skip(self), fields(module_id = self.module_id))]
    pub async fn load(&self) {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let outcome: crate::core::gateway::Result<Option<Vec<SessionRecord>>> = call(
            self.gateway.as_ref(),
            "list_module_sessions",
            &json!({ "request": { "module_id": self.module_id } }),
            Envelope::Data,
        )
        .await;

        let mut state = self.state.write().await;
        state.loading = false;
        match outcome {
            Ok(records) => {
                state.sessions = normalize_sessions(records.unwrap_or_default());
                debug!(count = state.sessions.len(), "sessions loaded");
            }
            Err(e) => {
                warn!(error = %e, "failed to load sessions");
                state.error = Some(format!("Failed to load sessions: {e}"));
                state.sessions.clear();
            }
        }
    }

    #[instrument(skip(self, data), fields(module_id = self.module_id))]
    pub async fn create(&self, data: &NewSession) -> Result<Session> {
        let mut request = serde_json::to_value(data).unwrap_or_else(|_| json!({}));
        if let Value::Object(fields) = &mut request {
            fields.insert("module_id".to_string(), json!(self.module_id));
        }

        let outcome = self
            .session_command("create_session", json!({ "request": request }))
            .await
            .operation("create session");
        let mut state = self.state.write().await;
        match outcome {
            Ok(record) => {
                let session = record.normalize(next_number(&state.sessions));
                state.sessions.push(session.clone());
                Ok(session)
            }
            Err(e) => {
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    #[instrument(skip(self, updates))]
    pub async fn update(&self, session_id: i64, updates: &SessionUpdate) -> Result<Session> {
        let mut args = serde_json::to_value(updates).unwrap_or_else(|_| json!({}));
        if let Value::Object(fields) = &mut args {
            fields.insert("sessionId".to_string(), json!(session_id));
        }
        let outcome = self
            .session_command("update_session", args)
            .await
            .operation("update session");
        self.apply(session_id, outcome).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, session_id: i64) -> Result<()> {
        let outcome = self
            .gateway
            .invoke("delete_session", json!({ "sessionId": session_id }))
            .await
            .operation("delete session");

        let mut state = self.state.write().await;
        match outcome {
            Ok(_) => {
                state.sessions.retain(|s| s.id != session_id);
                Ok(())
            }
            Err(e) => {
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Move a session to `target_phase`. Completing a session also bumps
    /// the module's session count; that follow-up never fails the call.
    #[instrument(skip(self))]
    pub async fn transition(&self, session_id: i64, target_phase: &str) -> Result<Session> {
        let outcome = self
            .session_command(
                "transition_session",
                json!({ "sessionId": session_id, "targetPhase": target_phase }),
            )
            .await
            .operation("transition session");
        let session = self.apply(session_id, outcome).await?;

        if target_phase == STATUS_COMPLETED {
            self.increment_module_sessions().await;
        }
        Ok(session)
    }

    /// Status change through the backend's session board.
    #[instrument(skip(self))]
    pub async fn transition_session_status(&self, session_id: i64, new_status: &str) -> Result<Session> {
        let outcome = self
            .session_command(
                "transition_session_status",
                json!({ "request": { "session_id": session_id, "new_status": new_status } }),
            )
            .await
            .operation("transition session status");
        self.apply(session_id, outcome).await
    }

    // ------------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------------

    pub async fn sessions(&self) -> Vec<Session> {
        self.state.read().await.sessions.clone()
    }

    pub async fn with_status(&self, status: &str) -> Vec<Session> {
        self.state
            .read()
            .await
            .sessions
            .iter()
            .filter(|s| s.status == status)
            .cloned()
            .collect()
    }

    pub async fn active_sessions(&self) -> Vec<Session> {
        self.with_status(STATUS_ACTIVE).await
    }

    pub async fn planned_sessions(&self) -> Vec<Session> {
        self.with_status(STATUS_PLANNED).await
    }

    pub async fn completed_sessions(&self) -> Vec<Session> {
        self.with_status(STATUS_COMPLETED).await
    }

    pub async fn total_sessions(&self) -> usize {
        self.state.read().await.sessions.len()
    }

    pub async fn has_active_sessions(&self) -> bool {
        self.state
            .read()
            .await
            .sessions
            .iter()
            .any(|s| s.status == STATUS_ACTIVE)
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    async fn session_command(&self, command: &str, args: Value) -> crate::core::gateway::Result<SessionRecord> {
        call(self.gateway.as_ref(), command, &args, Envelope::Data).await
    }

    /// Swap the returned session into the held list.
    async fn apply(&self, session_id: i64, outcome: Result<SessionRecord>) -> Result<Session> {
        let mut state = self.state.write().await;
        let record = match outcome {
            Ok(record) => record,
            Err(e) => {
                state.error = Some(e.to_string());
                return Err(e);
            }
        };

        match state.sessions.iter_mut().find(|s| s.id == session_id) {
            Some(slot) => {
                let session = record.normalize(slot.session_number);
                *slot = session.clone();
                Ok(session)
            }
            None => Ok(record.normalize(next_number(&state.sessions))),
        }
    }

    async fn increment_module_sessions(&self) {
        if let Some(modules) = &self.modules {
            modules.increment_session_count(self.module_id).await;
            return;
        }
        if let Err(e) = self
            .gateway
            .invoke("increment_module_sessions", json!({ "moduleId": self.module_id }))
            .await
        {
            warn!(error = %e, module_id = self.module_id, "failed to increment session count");
        }
    }
}

fn next_number(sessions: &[Session]) -> u32 {
    u32::try_from(sessions.len()).map_or(u32::MAX, |n| n.saturating_add(1))
}
