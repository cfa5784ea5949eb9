//! The restricted surface handed to window content.
//!
//! A [`ContentBridge`] can do two things: send a call to the host and wait
//! for its reply, or subscribe to host events. It holds no other
//! capability. Content code receives a bridge as an explicit argument;
//! there is no global instance.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ciska_common::{Event, EventBus};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::channel::{Envelope, Frame, Reply, MESSAGE_CHANNEL, OPEN_DIALOG_CHANNEL};
use crate::dialog::OpenDialogOptions;
use crate::error::{ApiError, ApiResponse};
use crate::messages::ApiMessage;

#[derive(Clone)]
pub struct ContentBridge {
    requests: mpsc::Sender<Frame>,
    events: EventBus,
    next_id: Arc<AtomicU64>,
}

impl ContentBridge {
    pub(crate) fn new(requests: mpsc::Sender<Frame>, events: EventBus) -> Self {
        Self {
            requests,
            events,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Typed call. The action and both payload shapes come from `M`.
    pub async fn message<M: ApiMessage>(
        &self,
        request: M::Request,
    ) -> Result<M::Response, ApiError> {
        let action = M::ACTION.name();
        let request = serde_json::to_value(request).map_err(|e| ApiError::InvalidRequest {
            action: action.to_string(),
            reason: e.to_string(),
        })?;
        let value = self.message_raw(action, request).await.into_result()?;
        serde_json::from_value(value).map_err(|e| {
            ApiError::malformed(format!("unexpected response for {action}: {e}"))
        })
    }

    /// Untyped call by action name.
    pub async fn message_raw(&self, action: &str, request: Value) -> ApiResponse {
        let payload = Value::Array(vec![Value::String(action.to_string()), request]);
        self.send(MESSAGE_CHANNEL, payload).await
    }

    /// Ask the host to show its file picker.
    pub async fn open_dialog(&self, options: OpenDialogOptions) -> Result<Vec<PathBuf>, ApiError> {
        let payload =
            serde_json::to_value(options).map_err(|e| ApiError::malformed(e.to_string()))?;
        let value = self.send(OPEN_DIALOG_CHANNEL, payload).await.into_result()?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::malformed(format!("unexpected dialog response: {e}")))
    }

    /// Subscribe to host events on `channel`.
    pub fn on(&self, channel: impl Into<String>) -> EventSubscription {
        EventSubscription {
            channel: channel.into(),
            receiver: self.events.subscribe(),
        }
    }

    /// Send one envelope on `channel` and wait for the matching reply.
    pub(crate) async fn send(&self, channel: &str, payload: Value) -> ApiResponse {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let envelope = Envelope {
            id,
            channel: channel.to_string(),
            payload,
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        let frame = Frame {
            text: envelope.to_json(),
            reply: reply_tx,
        };

        if self.requests.send(frame).await.is_err() {
            tracing::warn!(id, channel, "host gone before call was sent");
            return ApiResponse::Error(ApiError::Disconnected);
        }

        let raw = match reply_rx.await {
            Ok(raw) => raw,
            Err(_) => {
                tracing::warn!(id, channel, "host dropped call without replying");
                return ApiResponse::Error(ApiError::Disconnected);
            }
        };

        match Reply::from_json(&raw) {
            Ok(reply) if reply.id == id => reply.payload,
            Ok(reply) => {
                tracing::warn!(id, got = reply.id, channel, "reply id mismatch");
                ApiResponse::Error(ApiError::malformed(format!(
                    "reply id {} does not match call id {id}",
                    reply.id
                )))
            }
            Err(e) => {
                tracing::warn!(id, channel, error = %e, "unreadable reply");
                ApiResponse::Error(ApiError::malformed(e.to_string()))
            }
        }
    }
}

/// Stream of event payloads for a single channel.
pub struct EventSubscription {
    channel: String,
    receiver: broadcast::Receiver<Event>,
}

impl EventSubscription {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Next payload on this channel, or `None` once the host's bus is gone.
    /// Events for other channels are skipped.
    pub async fn recv(&mut self) -> Option<Value> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.channel == self.channel => return Some(event.payload),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(channel = %self.channel, skipped, "event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
