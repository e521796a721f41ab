//! Response envelope handling.
//!
//! Backend commands do not share one response shape. Catalog searches return
//! the bare array, board and campaign commands wrap their payload in
//! `{ success, data, message }`, and a couple of detail commands hand back a
//! JSON document serialized into a string. Each call site names the shape it
//! expects instead of guessing from the payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{GatewayError, Result};

/// Wire shape of a command's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// The response is the payload itself.
    Bare,
    /// `{ success: bool, data?: T, message?: string }`
    Wrapped,
    /// `{ data?: T }` with no success flag (module and session commands).
    Data,
    /// A JSON document encoded as a string, or `null`.
    JsonString,
}

/// The `{ success, data, message }` wrapper used by campaign-side commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

impl Envelope {
    /// Strip the envelope from `raw` and deserialize the payload.
    ///
    /// A wrapped `success: true` with no `data` yields `null` as the payload,
    /// so `R = Option<_>` reads it as "not found".
    pub fn decode<R: DeserializeOwned>(self, command: &str, raw: Value) -> Result<R> {
        let payload = match self {
            Envelope::Bare => raw,
            Envelope::Wrapped => unwrap_api_response(command, raw)?,
            Envelope::Data => match raw {
                Value::Object(mut object) => object.remove("data").unwrap_or(Value::Null),
                other => {
                    let source = <serde_json::Error as serde::de::Error>::custom(format!(
                        "expected {{data}} wrapper, got {}",
                        type_name(&other)
                    ));
                    return Err(GatewayError::DecodeResponse {
                        command: command.to_string(),
                        source,
                    });
                }
            },
            Envelope::JsonString => match raw {
                Value::String(text) => {
                    serde_json::from_str(&text).map_err(|source| GatewayError::DecodeResponse {
                        command: command.to_string(),
                        source,
                    })?
                }
                other => other,
            },
        };

        serde_json::from_value(payload).map_err(|source| GatewayError::DecodeResponse {
            command: command.to_string(),
            source,
        })
    }
}

fn unwrap_api_response(command: &str, raw: Value) -> Result<Value> {
    let mut object = match raw {
        Value::Object(object) => object,
        other => {
            let source = <serde_json::Error as serde::de::Error>::custom(format!(
                "expected {{success, data}} wrapper, got {}",
                type_name(&other)
            ));
            return Err(GatewayError::DecodeResponse {
                command: command.to_string(),
                source,
            });
        }
    };

    let success = object
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if !success {
        let message = object
            .get("message")
            .or_else(|| object.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("backend reported failure")
            .to_string();
        return Err(GatewayError::Rejected {
            command: command.to_string(),
            message,
        });
    }

    Ok(object.remove("data").unwrap_or(Value::Null))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
