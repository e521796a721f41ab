//! Remote call gateway.
//!
//! Every backend interaction goes through one asynchronous primitive:
//! a command name plus a JSON argument record, resolved with the backend's
//! JSON response or rejected with a [`GatewayError`].
//!
//! - [`Gateway`] - the transport trait the host shell implements
//! - [`MemoryGateway`] - in-process command router for offline use and tests
//! - [`call`] - typed helper that encodes args and strips the response [`Envelope`]
//!
//! # Example
//!
//! ```rust,ignore
//! use tomekeeper::core::gateway::{call, Envelope, MemoryGateway};
//!
//! let gateway = MemoryGateway::new().with_response("search_spells", json!([]));
//! let spells: Vec<SpellSummary> =
//!     call(&gateway, "search_spells", &json!({ "query": null }), Envelope::Bare).await?;
//! ```

mod envelope;
mod error;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub use envelope::{ApiResponse, Envelope};
pub use error::{GatewayError, Result};
pub use memory::{MemoryGateway, RecordedCall};

/// Transport to the host application's command handlers.
///
/// Implementations must be `Send + Sync`; façades share one gateway
/// behind an `Arc` and may issue calls from several tasks at once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Invoke `command` with `args` and return the raw JSON response.
    async fn invoke(&self, command: &str, args: Value) -> Result<Value>;
}

/// Shared handle used by every façade and service.
pub type SharedGateway = Arc<dyn Gateway>;

#[async_trait]
impl<G: Gateway + ?Sized> Gateway for Arc<G> {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value> {
        (**self).invoke(command, args).await
    }
}

/// Invoke a command with typed arguments and response.
pub async fn call<A, R>(
    gateway: &dyn Gateway,
    command: &str,
    args: &A,
    envelope: Envelope,
) -> Result<R>
where
    A: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let args = serde_json::to_value(args).map_err(|source| GatewayError::EncodeArgs {
        command: command.to_string(),
        source,
    })?;

    tracing::trace!(command, "invoking backend command");
    let raw = gateway.invoke(command, args).await?;
    envelope.decode(command, raw)
}

/// Invoke a command that takes no arguments.
pub async fn call_no_args<R: DeserializeOwned>(
    gateway: &dyn Gateway,
    command: &str,
    envelope: Envelope,
) -> Result<R> {
    call(gateway, command, &serde_json::json!({}), envelope).await
}
