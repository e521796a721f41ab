//! In-memory command router.
//!
//! [`MemoryGateway`] maps command names to handlers and records every call
//! it receives. Useful for:
//!
//! - Unit and integration tests that need a scripted backend
//! - Offline demos where the host shell is not running
//!
//! Handlers can be fixed responses, synchronous closures, or async closures
//! (the latter let tests hold a response back to exercise overlapping calls).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use tracing::instrument;

use super::{Gateway, GatewayError, Result};

type Handler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// One invocation seen by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub command: String,
    pub args: Value,
}

/// In-memory gateway.
///
/// Cloning shares both the handler table and the call log.
#[derive(Clone, Default)]
pub struct MemoryGateway {
    handlers: Arc<RwLock<HashMap<String, Handler>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl std::fmt::Debug for MemoryGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let commands: Vec<String> = self
            .handlers
            .read()
            .map(|h| h.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("MemoryGateway")
            .field("commands", &commands)
            .finish()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an async handler for `command`, replacing any previous one.
    pub fn register<F, Fut>(&self, command: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Value>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |args| handler(args).boxed());
        self.handlers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(command.into(), handler);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_async_handler<F, Fut>(self, command: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Value>> + Send + 'static,
    {
        self.register(command, handler);
        self
    }

    /// Register a synchronous handler.
    pub fn with_handler<F>(self, command: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        self.with_async_handler(command, move |args| {
            let handler = Arc::clone(&handler);
            async move { handler(args) }
        })
    }

    /// Always answer `command` with `response`.
    pub fn with_response(self, command: impl Into<String>, response: Value) -> Self {
        self.with_handler(command, move |_| Ok(response.clone()))
    }

    /// Always reject `command` with a transport error carrying `message`.
    pub fn with_failure(self, command: impl Into<String>, message: impl Into<String>) -> Self {
        let command = command.into();
        let message = message.into();
        let name = command.clone();
        self.with_handler(command, move |_| Err(GatewayError::transport(name.clone(), message.clone())))
    }

    /// Snapshot of every call received so far, in arrival order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of times `command` was invoked.
    pub fn call_count(&self, command: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|c| c.command == command)
            .count()
    }

    /// Arguments of the most recent call to `command`.
    pub fn last_args(&self, command: &str) -> Option<Value> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .find(|c| c.command == command)
            .map(|c| c.args.clone())
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    #[instrument(skip(self, args))]
    async fn invoke(&self, command: &str, args: Value) -> Result<Value> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                command: command.to_string(),
                args: args.clone(),
            });

        let handler = self
            .handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(command)
            .cloned();

        match handler {
            Some(handler) => handler(args).await,
            None => Err(GatewayError::UnknownCommand(command.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fixed_response_and_call_log() {
        let gateway = MemoryGateway::new().with_response("get_cult_types", json!(["Elemental"]));

        let reply = gateway.invoke("get_cult_types", json!({})).await.unwrap();
        assert_eq!(reply, json!(["Elemental"]));
        assert_eq!(gateway.call_count("get_cult_types"), 1);
        assert_eq!(gateway.calls()[0].command, "get_cult_types");
    }

    #[tokio::test]
    async fn test_unknown_command_rejects() {
        let gateway = MemoryGateway::new();
        let err = gateway.invoke("nope", Value::Null).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnknownCommand(ref c) if c == "nope"));
        // Rejected calls are still recorded
        assert_eq!(gateway.call_count("nope"), 1);
    }

    #[tokio::test]
    async fn test_handler_sees_args() {
        let gateway = MemoryGateway::new()
            .with_handler("echo", |args| Ok(args["value"].clone()));

        let reply = gateway.invoke("echo", json!({"value": 42})).await.unwrap();
        assert_eq!(reply, json!(42));
        assert_eq!(gateway.last_args("echo"), Some(json!({"value": 42})));
    }

    #[tokio::test]
    async fn test_failure_handler() {
        let gateway = MemoryGateway::new().with_failure("search_traps", "database locked");
        let err = gateway.invoke("search_traps", json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "Command 'search_traps' failed: database locked");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let gateway = MemoryGateway::new();
        let clone = gateway.clone();
        clone.register("late", |_| async { Ok(json!(true)) });

        assert_eq!(gateway.invoke("late", Value::Null).await.unwrap(), json!(true));
        assert_eq!(clone.call_count("late"), 1);
    }
}
