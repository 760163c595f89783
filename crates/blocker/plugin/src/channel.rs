//! Method-channel call and response types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Block list and app management channel.
pub const APP_BLOCK_MANAGER_CHANNEL: &str = "com.block_app/app_block_manager";
/// Permission check/request channel.
pub const PERMISSION_MANAGER_CHANNEL: &str = "com.block_app/permission_manager";
/// Channel used by the overlay UI.
pub const OVERLAY_CHANNEL: &str = "com.block_app/app_blocking_overlay";

/// Error code for missing or malformed arguments.
pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
/// Error code for failed operations.
pub const ERROR: &str = "ERROR";

/// A method invocation from the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Map::new(),
        }
    }

    pub fn with_argument(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.to_string(), value.into());
        self
    }

    /// Optional argument. `null` counts as absent.
    pub fn argument<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ChannelError> {
        match self.arguments.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                ChannelError::invalid_argument(format!("invalid `{key}` argument: {e}"))
            }),
        }
    }

    /// Required argument.
    pub fn required_argument<T: DeserializeOwned>(&self, key: &str) -> Result<T, ChannelError> {
        self.argument(key)?
            .ok_or_else(|| ChannelError::invalid_argument(format!("`{key}` argument is required")))
    }
}

/// Result of a method invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResponse {
    Success {
        result: Value,
    },
    Error {
        code: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
    NotImplemented,
}

impl MethodResponse {
    pub fn success(result: impl Serialize) -> Self {
        match serde_json::to_value(result) {
            Ok(result) => Self::Success { result },
            Err(e) => ChannelError {
                code: ERROR,
                message: "failed to encode result".to_string(),
                details: Some(e.to_string()),
            }
            .into(),
        }
    }
}

impl From<ChannelError> for MethodResponse {
    fn from(error: ChannelError) -> Self {
        Self::Error {
            code: error.code.to_string(),
            message: error.message,
            details: error.details,
        }
    }
}

/// A failed method call, reported to the caller as a tagged error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ChannelError {
    pub code: &'static str,
    pub message: String,
    pub details: Option<String>,
}

impl ChannelError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            code: INVALID_ARGUMENT,
            message: message.into(),
            details: None,
        }
    }

    /// Operation failure caused by `source`.
    pub fn failed(message: impl Into<String>, source: &color_eyre::eyre::Report) -> Self {
        Self {
            code: ERROR,
            message: message.into(),
            details: Some(format!("{source:#}")),
        }
    }
}

/// Convert a handler result into a response.
pub fn respond<T: Serialize>(result: Result<T, ChannelError>) -> MethodResponse {
    match result {
        Ok(value) => MethodResponse::success(value),
        Err(e) => {
            tracing::warn!(code = e.code, message = %e.message, "method call failed");
            e.into()
        }
    }
}

/// Handles calls on one channel.
pub trait MethodHandler: Send + Sync {
    fn on_method_call(&self, call: &MethodCall) -> MethodResponse;
}
