//! Errors that travel back to the caller as data.

use serde::{Deserialize, Serialize};

/// Failure of a single call.
///
/// Serialized with a `kind` tag so content code can branch on it:
/// `{"kind":"unknownAction","action":"deleteEverything"}`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ApiError {
    #[error("unknown action: {action}")]
    UnknownAction { action: String },

    #[error("unknown channel: {channel}")]
    UnknownChannel { channel: String },

    #[error("malformed message: {reason}")]
    MalformedMessage { reason: String },

    #[error("invalid request for {action}: {reason}")]
    InvalidRequest { action: String, reason: String },

    #[error("handler for {action} failed: {reason}")]
    HandlerFailure { action: String, reason: String },

    #[error("host disconnected")]
    Disconnected,
}

impl ApiError {
    pub fn unknown_action(action: impl Into<String>) -> Self {
        Self::UnknownAction {
            action: action.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedMessage {
            reason: reason.into(),
        }
    }

    pub fn handler_failure(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::HandlerFailure {
            action: action.into(),
            reason: reason.into(),
        }
    }
}

/// Wire form of a call result: `{"ok": ...}` or `{"error": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiResponse {
    Ok(serde_json::Value),
    Error(ApiError),
}

impl ApiResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn into_result(self) -> Result<serde_json::Value, ApiError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Error(err) => Err(err),
        }
    }
}

impl From<Result<serde_json::Value, ApiError>> for ApiResponse {
    fn from(result: Result<serde_json::Value, ApiError>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(err) => Self::Error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_display() {
        assert_eq!(
            ApiError::unknown_action("nope").to_string(),
            "unknown action: nope"
        );
        assert_eq!(
            ApiError::handler_failure("addNewProject", "boom").to_string(),
            "handler for addNewProject failed: boom"
        );
        assert_eq!(ApiError::Disconnected.to_string(), "host disconnected");
    }

    #[test]
    fn error_wire_shape_is_kind_tagged() {
        let value = serde_json::to_value(ApiError::unknown_action("nope")).unwrap();
        assert_eq!(value, json!({"kind": "unknownAction", "action": "nope"}));

        let value = serde_json::to_value(ApiError::Disconnected).unwrap();
        assert_eq!(value, json!({"kind": "disconnected"}));
    }

    #[test]
    fn response_wire_shape() {
        let ok = serde_json::to_value(ApiResponse::Ok(json!({}))).unwrap();
        assert_eq!(ok, json!({"ok": {}}));

        let err = serde_json::to_value(ApiResponse::Error(ApiError::malformed("x"))).unwrap();
        assert_eq!(
            err,
            json!({"error": {"kind": "malformedMessage", "reason": "x"}})
        );
    }

    #[test]
    fn response_parses_back_into_result() {
        let raw = r#"{"error":{"kind":"handlerFailure","action":"loadConfig","reason":"disk"}}"#;
        let response: ApiResponse = serde_json::from_str(raw).unwrap();
        assert!(!response.is_ok());
        assert_eq!(
            response.into_result().unwrap_err(),
            ApiError::handler_failure("loadConfig", "disk")
        );
    }
}
