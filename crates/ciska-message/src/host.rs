//! Host-side routing of envelopes to the dispatcher and the file picker.

use std::panic::AssertUnwindSafe;

use ciska_common::{new_correlation_id, Event, EventBus};
use futures_util::FutureExt;
use serde_json::Value;

use crate::channel::{Envelope, HostEndpoint, Reply, MESSAGE_CHANNEL, OPEN_DIALOG_CHANNEL};
use crate::dialog::{FilePicker, OpenDialogOptions};
use crate::dispatcher::{panic_message, Dispatcher};
use crate::error::{ApiError, ApiResponse};
use crate::use_cases::UseCases;

pub struct Host<U, P> {
    dispatcher: Dispatcher<U>,
    picker: P,
    events: EventBus,
    session: String,
}

impl<U: UseCases, P: FilePicker> Host<U, P> {
    pub fn new(use_cases: U, picker: P, events: EventBus) -> Self {
        Self {
            dispatcher: Dispatcher::new(use_cases),
            picker,
            events,
            session: new_correlation_id(),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<U> {
        &self.dispatcher
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Push an event to every content subscriber of `channel`.
    pub fn emit(&self, channel: &str, payload: Value) -> usize {
        let delivered = self.events.publish(Event::new(channel, payload));
        tracing::debug!(session = %self.session, channel, delivered, "event emitted");
        delivered
    }

    /// Route one envelope and build its reply.
    pub async fn route(&self, envelope: Envelope) -> Reply {
        let Envelope {
            id,
            channel,
            payload,
        } = envelope;
        tracing::debug!(session = %self.session, id, channel = %channel, "envelope received");

        let payload = match channel.as_str() {
            MESSAGE_CHANNEL => self.dispatcher.dispatch_message(payload),
            OPEN_DIALOG_CHANNEL => self.open_dialog(payload).await,
            other => {
                tracing::warn!(
                    session = %self.session,
                    id,
                    channel = other,
                    "envelope rejected: unknown channel"
                );
                ApiResponse::Error(ApiError::UnknownChannel {
                    channel: other.to_string(),
                })
            }
        };
        Reply { id, payload }
    }

    /// Decode a serialized envelope, route it, and serialize the reply.
    ///
    /// Text that is not an envelope still gets a `malformedMessage` reply,
    /// using the `id` field if one can be read (0 otherwise).
    pub async fn handle_text(&self, text: &str) -> String {
        let reply = match Envelope::from_json(text) {
            Ok(envelope) => self.route(envelope).await,
            Err(e) => {
                tracing::warn!(
                    session = %self.session,
                    body_len = text.len(),
                    error = %e,
                    "envelope rejected: failed to parse"
                );
                Reply {
                    id: salvage_id(text),
                    payload: ApiResponse::Error(ApiError::malformed(e.to_string())),
                }
            }
        };
        reply.to_json()
    }

    /// Answer calls one at a time until every bridge is dropped.
    pub async fn serve(&self, mut endpoint: HostEndpoint) {
        tracing::info!(session = %self.session, "host loop started");
        while let Some(call) = endpoint.recv().await {
            let reply = self.handle_text(call.text()).await;
            if !call.respond(reply) {
                tracing::debug!(session = %self.session, "caller went away before reply");
            }
        }
        tracing::info!(session = %self.session, "host loop finished");
    }

    async fn open_dialog(&self, payload: Value) -> ApiResponse {
        let options: OpenDialogOptions = match payload {
            Value::Null => OpenDialogOptions::default(),
            other => match serde_json::from_value(other) {
                Ok(options) => options,
                Err(e) => {
                    return ApiResponse::Error(ApiError::InvalidRequest {
                        action: OPEN_DIALOG_CHANNEL.to_string(),
                        reason: e.to_string(),
                    })
                }
            },
        };

        let picked = AssertUnwindSafe(self.picker.pick(options))
            .catch_unwind()
            .await;
        match picked {
            Ok(Ok(paths)) => {
                tracing::info!(session = %self.session, count = paths.len(), "dialog closed");
                let paths: Vec<Value> = paths
                    .into_iter()
                    .map(|p| Value::String(p.to_string_lossy().into_owned()))
                    .collect();
                ApiResponse::Ok(Value::Array(paths))
            }
            Ok(Err(e)) => {
                tracing::warn!(session = %self.session, error = %e, "dialog failed");
                ApiResponse::Error(ApiError::handler_failure(OPEN_DIALOG_CHANNEL, e.to_string()))
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                tracing::error!(session = %self.session, reason = %reason, "file picker panicked");
                ApiResponse::Error(ApiError::handler_failure(
                    OPEN_DIALOG_CHANNEL,
                    format!("panicked: {reason}"),
                ))
            }
        }
    }
}

fn salvage_id(text: &str) -> u64 {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("id").and_then(Value::as_u64))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::NullPicker;
    use crate::use_cases::ShellUseCases;
    use ciska_config::ConfigStore;
    use serde_json::json;

    fn host(dir: &std::path::Path) -> Host<ShellUseCases, NullPicker> {
        Host::new(
            ShellUseCases::new(ConfigStore::new(dir)),
            NullPicker,
            EventBus::new(8),
        )
    }

    #[tokio::test]
    async fn routes_message_channel() {
        let dir = tempfile::tempdir().unwrap();
        let h = host(dir.path());
        assert!(h.dispatcher().dispatch("addNewProject", json!({})).is_ok());

        let reply = h
            .route(Envelope {
                id: 4,
                channel: "message".into(),
                payload: json!(["addNewProject", {}]),
            })
            .await;
        assert_eq!(reply.id, 4);
        assert_eq!(reply.payload, ApiResponse::Ok(json!({})));
    }

    #[tokio::test]
    async fn unknown_channel() {
        let dir = tempfile::tempdir().unwrap();
        let reply = host(dir.path())
            .route(Envelope {
                id: 1,
                channel: "eval".into(),
                payload: json!("alert(1)"),
            })
            .await;
        assert_eq!(
            reply.payload,
            ApiResponse::Error(ApiError::UnknownChannel {
                channel: "eval".into()
            })
        );
    }

    #[tokio::test]
    async fn unknown_channel_over_the_wire() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"{"id":7,"channel":"shell.openExternal","payload":"https://example.com"}"#;

        let reply = Reply::from_json(&host(dir.path()).handle_text(text).await).unwrap();
        assert_eq!(reply.id, 7);
        assert_eq!(
            reply.payload,
            ApiResponse::Error(ApiError::UnknownChannel {
                channel: "shell.openExternal".into()
            })
        );
    }

    #[tokio::test]
    async fn open_dialog_with_null_picker() {
        let dir = tempfile::tempdir().unwrap();
        let reply = host(dir.path())
            .route(Envelope {
                id: 2,
                channel: "openDialog".into(),
                payload: json!({"properties": ["openFile"]}),
            })
            .await;
        assert_eq!(reply.payload, ApiResponse::Ok(json!([])));
    }

    #[tokio::test]
    async fn open_dialog_bad_options() {
        let dir = tempfile::tempdir().unwrap();
        let reply = host(dir.path())
            .route(Envelope {
                id: 2,
                channel: "openDialog".into(),
                payload: json!({"properties": ["deleteFiles"]}),
            })
            .await;
        assert!(matches!(
            reply.payload,
            ApiResponse::Error(ApiError::InvalidRequest { .. })
        ));
    }

    #[tokio::test]
    async fn garbage_text_gets_malformed_reply() {
        let dir = tempfile::tempdir().unwrap();
        let h = host(dir.path());

        let reply = Reply::from_json(&h.handle_text("not json").await).unwrap();
        assert_eq!(reply.id, 0);
        assert!(matches!(
            reply.payload,
            ApiResponse::Error(ApiError::MalformedMessage { .. })
        ));

        let reply = Reply::from_json(&h.handle_text(r#"{"id":12}"#).await).unwrap();
        assert_eq!(reply.id, 12);
    }

    #[tokio::test]
    async fn emit_reaches_subscribers() {
        let dir = tempfile::tempdir().unwrap();
        let h = host(dir.path());
        assert_eq!(h.emit("startPoll", json!(null)), 0);

        let mut rx = h.events().subscribe();
        assert_eq!(h.emit("startPoll", json!(null)), 1);
        assert_eq!(rx.recv().await.unwrap().channel, "startPoll");
    }
}
