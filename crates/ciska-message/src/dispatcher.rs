//! Action lookup and execution on the host side.

use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;

use crate::error::{ApiError, ApiResponse};
use crate::messages::{AddNewProject, ApiAction, ApiMessage, LoadConfig};
use crate::use_cases::{HandlerError, UseCases};

/// Resolves action names to [`UseCases`] methods and turns every failure
/// into an [`ApiError`] value.
pub struct Dispatcher<U> {
    use_cases: U,
}

impl<U: UseCases> Dispatcher<U> {
    pub fn new(use_cases: U) -> Self {
        Self { use_cases }
    }

    /// Decode a `[action, request]` payload and dispatch it.
    pub fn dispatch_message(&self, payload: Value) -> ApiResponse {
        match payload {
            Value::Array(mut parts) if parts.len() == 2 => {
                let request = parts.pop().unwrap_or(Value::Null);
                match parts.pop() {
                    Some(Value::String(action)) => self.dispatch(&action, request),
                    _ => {
                        tracing::warn!("message rejected: action is not a string");
                        ApiResponse::Error(ApiError::malformed("action must be a string"))
                    }
                }
            }
            other => {
                tracing::warn!(
                    kind = json_kind(&other),
                    "message rejected: expected [action, request]"
                );
                ApiResponse::Error(ApiError::malformed(
                    "payload must be a two-element [action, request] array",
                ))
            }
        }
    }

    /// Run the handler registered for `action`.
    pub fn dispatch(&self, action: &str, request: Value) -> ApiResponse {
        let result = action
            .parse::<ApiAction>()
            .and_then(|action| self.invoke(action, request));

        match &result {
            Ok(_) => tracing::debug!(action, "useCase completed"),
            Err(e) => tracing::warn!(action, error = %e, "useCase failed"),
        }
        result.into()
    }

    /// Typed dispatch for in-process callers. The request still goes
    /// through the same decode and validation as a wire call.
    pub fn dispatch_typed<M: ApiMessage>(
        &self,
        request: M::Request,
    ) -> Result<M::Response, ApiError> {
        let action = M::ACTION.name();
        let request = serde_json::to_value(request).map_err(|e| ApiError::InvalidRequest {
            action: action.to_string(),
            reason: e.to_string(),
        })?;
        let value = self.invoke(M::ACTION, request)?;
        serde_json::from_value(value).map_err(|e| ApiError::malformed(e.to_string()))
    }

    fn invoke(&self, action: ApiAction, request: Value) -> Result<Value, ApiError> {
        tracing::debug!(action = %action, "call useCase");
        match action {
            ApiAction::AddNewProject => {
                run::<AddNewProject, _>(request, |req| self.use_cases.add_new_project(req))
            }
            ApiAction::LoadConfig => {
                run::<LoadConfig, _>(request, |req| self.use_cases.load_config(req))
            }
        }
    }
}

/// Decode the request, run the handler with panics contained, encode the
/// response.
fn run<M, F>(request: Value, handler: F) -> Result<Value, ApiError>
where
    M: ApiMessage,
    F: FnOnce(M::Request) -> Result<M::Response, HandlerError>,
{
    let action = M::ACTION.name();
    if !request.is_object() {
        return Err(ApiError::InvalidRequest {
            action: action.to_string(),
            reason: format!("expected an object, got {}", json_kind(&request)),
        });
    }
    let request: M::Request =
        serde_json::from_value(request).map_err(|e| ApiError::InvalidRequest {
            action: action.to_string(),
            reason: e.to_string(),
        })?;

    let response = match panic::catch_unwind(AssertUnwindSafe(|| handler(request))) {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => return Err(ApiError::handler_failure(action, e.to_string())),
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            tracing::error!(action, reason = %reason, "useCase panicked");
            return Err(ApiError::handler_failure(action, format!("panicked: {reason}")));
        }
    };

    serde_json::to_value(response).map_err(|e| ApiError::handler_failure(action, e.to_string()))
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
