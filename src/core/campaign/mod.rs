//! Campaign service layer.
//!
//! Typed wrappers over the backend's campaign, module, session and document
//! commands. Unlike the catalog façades these services propagate failures:
//! every mutation returns a [`Result`] and the caller decides whether to
//! surface it. Read paths keep small per-service caches that every mutation
//! invalidates.
//!
//! - [`CampaignService`] - campaign record, its documents, stage completion
//! - [`DocumentService`] - document CRUD and phase transitions
//! - [`ModuleService`] - modules, their documents and sessions
//! - [`SessionService`] - session list for one module with status projections

mod campaigns;
mod documents;
mod modules;
mod sessions;

use thiserror::Error;

use crate::core::boards::BoardError;
use crate::core::gateway::GatewayError;

pub use campaigns::{completed_template_ids, Campaign, CampaignService};
pub use documents::{Document, DocumentData, DocumentService, DocumentUpdate};
pub use modules::{Module, ModuleService, ModuleUpdate, NewModule};
pub use sessions::{NewSession, Session, SessionService, SessionUpdate};

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Failed to {operation}: {source}")]
    Gateway {
        operation: &'static str,
        #[source]
        source: GatewayError,
    },

    #[error("Module {0} not found")]
    ModuleNotFound(i64),

    #[error("Campaign {0} not found")]
    CampaignNotFound(i64),

    #[error(transparent)]
    Board(#[from] BoardError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Attach the failed operation's name to a gateway error.
pub(crate) trait OperationContext<T> {
    fn operation(self, operation: &'static str) -> Result<T>;
}

impl<T> OperationContext<T> for std::result::Result<T, GatewayError> {
    fn operation(self, operation: &'static str) -> Result<T> {
        self.map_err(|source| ServiceError::Gateway { operation, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_context_wraps_gateway_error() {
        let failed: std::result::Result<(), GatewayError> =
            Err(GatewayError::transport("delete_module", "locked"));
        let err = failed.operation("delete module").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to delete module: Command 'delete_module' failed: locked"
        );
    }
}
