//! Gateway Error Types
//!
//! Error handling for remote command invocation.

use thiserror::Error;

/// Remote call errors
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The host rejected the call before it reached a command handler,
    /// or the handler itself returned an error string.
    #[error("Command '{command}' failed: {message}")]
    Transport { command: String, message: String },

    /// A wrapped response came back with `success: false`.
    #[error("Command '{command}' rejected: {message}")]
    Rejected { command: String, message: String },

    #[error("No handler registered for command '{0}'")]
    UnknownCommand(String),

    #[error("Failed to serialize args for '{command}': {source}")]
    EncodeArgs {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to deserialize response from '{command}': {source}")]
    DecodeResponse {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

impl GatewayError {
    pub fn transport(command: impl Into<String>, message: impl Into<String>) -> Self {
        GatewayError::Transport {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Name of the command that produced this error.
    pub fn command(&self) -> &str {
        match self {
            GatewayError::Transport { command, .. }
            | GatewayError::Rejected { command, .. }
            | GatewayError::EncodeArgs { command, .. }
            | GatewayError::DecodeResponse { command, .. } => command,
            GatewayError::UnknownCommand(command) => command,
        }
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
