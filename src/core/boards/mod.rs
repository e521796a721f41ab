//! Board configuration cache.
//!
//! A board (campaign, module or session) is an ordered list of stages, each
//! gated by required and optional documents. Configurations are fetched once
//! per board type and kept for the life of the service. Everything past the
//! fetch is a pure read of the cache.

pub mod templates;

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::core::gateway::{call, Envelope, GatewayError, SharedGateway};

pub use templates::{template_info, title_from_id, TemplateInfo};

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Failed to fetch board configuration for '{board_type}': {source}")]
    Fetch {
        board_type: String,
        #[source]
        source: GatewayError,
    },

    #[error("Board type '{0}' not found")]
    NotFound(String),

    #[error("Board '{board_type}' has no stage '{stage}'")]
    UnknownStage { board_type: String, stage: String },

    #[error("Invalid board configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BoardError>;

// ============================================================================
// Types
// ============================================================================

/// A board's stages in progression order, plus its transition table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardConfig {
    pub board_type: String,
    pub stages: Vec<StageDefinition>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDefinition {
    pub key: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_documents: Vec<String>,
    #[serde(default)]
    pub optional_documents: Vec<String>,
    /// Required documents that gate nothing; exist once created.
    #[serde(default)]
    pub no_completion_required_documents: Vec<String>,
    #[serde(default)]
    pub metadata: StageMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageMetadata {
    pub completion_message: Option<String>,
    pub transition_prompt: Option<String>,
    pub help_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: String,
    pub to: String,
    pub allowed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCategory {
    Required,
    Optional,
}

/// A stage's template joined with its display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDocument {
    pub template_id: String,
    pub title: String,
    pub description: String,
    pub category: DocumentCategory,
}

/// Progress of a stage's required documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCompletion {
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
    pub is_complete: bool,
    pub missing_documents: Vec<String>,
}

// ============================================================================
// Backend wire shape
// ============================================================================

#[derive(Debug, Deserialize)]
struct BackendBoard {
    board_type: String,
    #[serde(default)]
    stages: Vec<BackendStage>,
    #[serde(default)]
    transitions: Vec<Transition>,
}

#[derive(Debug, Deserialize)]
struct BackendStage {
    key: String,
    display_name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    required_documents: Vec<String>,
    #[serde(default)]
    optional_documents: Vec<String>,
    #[serde(default)]
    no_completion_required_documents: Vec<String>,
    #[serde(default)]
    completion_message: Option<String>,
    #[serde(default)]
    transition_prompt: Option<String>,
    #[serde(default)]
    help_text: Option<String>,
}

impl From<BackendStage> for StageDefinition {
    fn from(stage: BackendStage) -> Self {
        Self {
            key: stage.key,
            display_name: stage.display_name,
            description: stage.description,
            required_documents: stage.required_documents,
            optional_documents: stage.optional_documents,
            no_completion_required_documents: stage.no_completion_required_documents,
            metadata: StageMetadata {
                completion_message: stage.completion_message,
                transition_prompt: stage.transition_prompt,
                help_text: stage.help_text,
            },
        }
    }
}

impl From<BackendBoard> for BoardConfig {
    fn from(board: BackendBoard) -> Self {
        Self {
            board_type: board.board_type,
            stages: board.stages.into_iter().map(StageDefinition::from).collect(),
            transitions: board.transitions,
        }
    }
}

impl BoardConfig {
    /// Parse a configuration in either the backend (`board_type`, flat stage
    /// metadata) or the client (`boardType`, nested `metadata`) shape.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        if value.get("board_type").is_some() {
            let backend: BackendBoard = serde_json::from_value(value)?;
            Ok(backend.into())
        } else {
            Ok(serde_json::from_value(value)?)
        }
    }

    pub fn stage(&self, key: &str) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.key == key)
    }

    /// Key of the stage after `key` in array order.
    pub fn next_stage(&self, key: &str) -> Option<&str> {
        let index = self.stages.iter().position(|s| s.key == key)?;
        self.stages.get(index + 1).map(|s| s.key.as_str())
    }

    /// Whether the transition table allows `from` → `to`. Pairs not listed
    /// are disallowed.
    pub fn can_transition(&self, from: &str, to: &str) -> bool {
        self.transitions
            .iter()
            .any(|t| t.from == from && t.to == to && t.allowed)
    }
}

// ============================================================================
// Pure operations
// ============================================================================

/// Required docs first, then optional, each joined with template metadata.
/// Unknown ids get a title synthesized from the id.
pub fn stage_documents(stage: &StageDefinition) -> Vec<StageDocument> {
    let required = stage
        .required_documents
        .iter()
        .map(|id| (id, DocumentCategory::Required));
    let optional = stage
        .optional_documents
        .iter()
        .map(|id| (id, DocumentCategory::Optional));

    required
        .chain(optional)
        .map(|(id, category)| match template_info(id) {
            Some(info) => StageDocument {
                template_id: id.clone(),
                title: info.title.to_string(),
                description: info.description.to_string(),
                category,
            },
            None => StageDocument {
                template_id: id.clone(),
                title: title_from_id(id),
                description: format!("Document: {id}"),
                category,
            },
        })
        .collect()
}

/// Completion of `stage` given the set of completed template ids.
///
/// A stage with no required documents is never complete.
pub fn calculate_stage_completion<S>(stage: &StageDefinition, completed_ids: &HashSet<S>) -> StageCompletion
where
    S: Borrow<str> + Hash + Eq,
{
    let total = stage.required_documents.len();
    let missing_documents: Vec<String> = stage
        .required_documents
        .iter()
        .filter(|id| !completed_ids.contains(id.as_str()))
        .cloned()
        .collect();
    let completed = total - missing_documents.len();
    let percentage = if total == 0 {
        0
    } else {
        (completed as f64 / total as f64 * 100.0).round() as u32
    };

    StageCompletion {
        completed,
        total,
        percentage,
        is_complete: total > 0 && completed == total,
        missing_documents,
    }
}

// ============================================================================
// BoardService
// ============================================================================

/// Per-process cache of board configurations keyed by board type.
pub struct BoardService {
    gateway: SharedGateway,
    boards: RwLock<HashMap<String, Arc<BoardConfig>>>,
}

impl BoardService {
    pub fn new(gateway: SharedGateway) -> Self {
        Self {
            gateway,
            boards: RwLock::new(HashMap::new()),
        }
    }

    /// Cached configuration, fetching it on first use.
    #[instrument(skip(self))]
    pub async fn fetch_board_config(&self, board_type: &str) -> Result<Arc<BoardConfig>> {
        if let Some(config) = self.get_board_config(board_type) {
            debug!("board configuration served from cache");
            return Ok(config);
        }

        let backend: Option<BackendBoard> = call(
            self.gateway.as_ref(),
            "get_board_configuration",
            &json!({ "boardType": board_type }),
            Envelope::Wrapped,
        )
        .await
        .map_err(|source| BoardError::Fetch {
            board_type: board_type.to_string(),
            source,
        })?;

        let config: BoardConfig = backend
            .ok_or_else(|| BoardError::NotFound(board_type.to_string()))?
            .into();
        info!(stages = config.stages.len(), "fetched board configuration");

        // Cached under the requested key so later lookups hit.
        let config = Arc::new(config);
        self.write().insert(board_type.to_string(), Arc::clone(&config));
        Ok(config)
    }

    /// Insert a configuration the caller already holds.
    pub fn cache_board(&self, config: BoardConfig) {
        self.write().insert(config.board_type.clone(), Arc::new(config));
    }

    pub fn get_board_config(&self, board_type: &str) -> Option<Arc<BoardConfig>> {
        self.boards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(board_type)
            .cloned()
    }

    pub fn get_stage_definition(&self, board_type: &str, stage_key: &str) -> Option<StageDefinition> {
        self.get_board_config(board_type)?.stage(stage_key).cloned()
    }

    /// Documents for a stage; empty when the board or stage is not cached.
    pub fn get_stage_documents(&self, board_type: &str, stage_key: &str) -> Vec<StageDocument> {
        self.get_stage_definition(board_type, stage_key)
            .map(|stage| stage_documents(&stage))
            .unwrap_or_default()
    }

    pub fn calculate_stage_completion<S>(
        &self,
        stage: &StageDefinition,
        completed_ids: &HashSet<S>,
    ) -> StageCompletion
    where
        S: Borrow<str> + Hash + Eq,
    {
        calculate_stage_completion(stage, completed_ids)
    }

    pub fn get_next_stage(&self, board_type: &str, stage_key: &str) -> Option<String> {
        self.get_board_config(board_type)?
            .next_stage(stage_key)
            .map(str::to_string)
    }

    pub fn can_transition(&self, board_type: &str, from: &str, to: &str) -> bool {
        self.get_board_config(board_type)
            .is_some_and(|config| config.can_transition(from, to))
    }

    /// Completion of a named stage on a cached board.
    pub fn stage_completion<S>(
        &self,
        board_type: &str,
        stage_key: &str,
        completed_ids: &HashSet<S>,
    ) -> Result<StageCompletion>
    where
        S: Borrow<str> + Hash + Eq,
    {
        let stage = self
            .get_stage_definition(board_type, stage_key)
            .ok_or_else(|| BoardError::UnknownStage {
                board_type: board_type.to_string(),
                stage: stage_key.to_string(),
            })?;
        Ok(calculate_stage_completion(&stage, completed_ids))
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<BoardConfig>>> {
        self.boards.write().unwrap_or_else(PoisonError::into_inner)
    }
}
