//! Frames that cross the host/content boundary, and the in-process
//! transport that carries them.
//!
//! Both directions carry JSON text, never Rust values, so the in-process
//! transport behaves like the stdio one:
//! - **content -> host**: [`Envelope`] `{"id":1,"channel":"message","payload":["addNewProject",{}]}`
//! - **host -> content**: [`Reply`] `{"id":1,"payload":{"ok":{}}}`
//! - **host -> content, unsolicited**: [`Event`](ciska_common::Event)
//!   `{"channel":"startPoll","payload":null}`

use ciska_common::EventBus;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::bridge::ContentBridge;
use crate::error::ApiResponse;

/// Channel carrying `[action, request]` pairs to the dispatcher.
pub const MESSAGE_CHANNEL: &str = "message";

/// Channel carrying [`OpenDialogOptions`](crate::OpenDialogOptions) to the picker.
pub const OPEN_DIALOG_CHANNEL: &str = "openDialog";

/// A request from content to host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: u64,
    pub channel: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// The host's answer to one [`Envelope`], matched by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: u64,
    pub payload: ApiResponse,
}

impl Envelope {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Reply {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"id":{},"payload":{{"error":{{"kind":"malformedMessage","reason":{}}}}}}}"#,
                self.id,
                serde_json::Value::String(e.to_string())
            )
        })
    }
}

/// One serialized envelope plus the slot its reply goes into.
pub(crate) struct Frame {
    pub(crate) text: String,
    pub(crate) reply: oneshot::Sender<String>,
}

/// An envelope waiting for the host to answer it.
pub struct IncomingCall {
    text: String,
    reply: oneshot::Sender<String>,
}

impl IncomingCall {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Send the serialized reply. Returns `false` when the caller has
    /// already gone away.
    pub fn respond(self, reply: String) -> bool {
        self.reply.send(reply).is_ok()
    }
}

/// Host side of the in-process transport.
pub struct HostEndpoint {
    requests: mpsc::Receiver<Frame>,
}

impl HostEndpoint {
    /// Next call, or `None` once every bridge clone has been dropped.
    pub async fn recv(&mut self) -> Option<IncomingCall> {
        self.requests.recv().await.map(|frame| IncomingCall {
            text: frame.text,
            reply: frame.reply,
        })
    }
}

/// Connect a content bridge to a host.
///
/// `capacity` bounds the number of envelopes queued for the host. `events`
/// is the bus the host emits on; the bridge can only subscribe to it.
pub fn pair(capacity: usize, events: &EventBus) -> (HostEndpoint, ContentBridge) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        HostEndpoint { requests: rx },
        ContentBridge::new(tx, events.clone()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use serde_json::json;

    #[test]
    fn envelope_wire_shape() {
        let envelope = Envelope {
            id: 7,
            channel: MESSAGE_CHANNEL.into(),
            payload: json!(["addNewProject", {}]),
        };
        let value: serde_json::Value = serde_json::from_str(&envelope.to_json()).unwrap();
        assert_eq!(
            value,
            json!({"id": 7, "channel": "message", "payload": ["addNewProject", {}]})
        );
        assert_eq!(Envelope::from_json(&envelope.to_json()).unwrap(), envelope);
    }

    #[test]
    fn envelope_without_payload_defaults_to_null() {
        let envelope = Envelope::from_json(r#"{"id":1,"channel":"openDialog"}"#).unwrap();
        assert_eq!(envelope.payload, serde_json::Value::Null);
    }

    #[test]
    fn reply_wire_shape() {
        let reply = Reply {
            id: 3,
            payload: ApiResponse::Error(ApiError::Disconnected),
        };
        let value: serde_json::Value = serde_json::from_str(&reply.to_json()).unwrap();
        assert_eq!(
            value,
            json!({"id": 3, "payload": {"error": {"kind": "disconnected"}}})
        );
    }

    #[tokio::test]
    async fn endpoint_closes_when_bridge_dropped() {
        let events = EventBus::new(4);
        let (mut host, bridge) = pair(4, &events);
        drop(bridge);
        assert!(host.recv().await.is_none());
    }
}
