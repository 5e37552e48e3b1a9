use crate::error::{OpenViduError, Result};
use crate::recording::RecordingStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server-pushed notification type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WebhookEventKind {
    SessionCreated,
    SessionDestroyed,
    ParticipantJoined,
    ParticipantLeft,
    WebrtcConnectionCreated,
    WebrtcConnectionDestroyed,
    RecordingStatusChanged,
    FilterEventDispatched,
    SignalSent,
    MediaNodeStatusChanged,
    #[serde(other)]
    Unknown,
}

/// A parsed webhook delivery; the raw payload is kept in `body`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    pub event: WebhookEventKind,
    pub session_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub body: Value,
}

impl WebhookEvent {
    pub fn from_payload(body: Value) -> Result<Self> {
        let object = body
            .as_object()
            .ok_or_else(|| OpenViduError::invalid("webhook payload must be a JSON object"))?;

        let name = object
            .get("event")
            .and_then(Value::as_str)
            .ok_or_else(|| OpenViduError::invalid("webhook payload has no event name"))?;

        let event = serde_json::from_value(Value::String(name.to_string()))
            .unwrap_or(WebhookEventKind::Unknown);

        let session_id = object
            .get("sessionId")
            .and_then(Value::as_str)
            .map(str::to_string);

        let timestamp = object
            .get("timestamp")
            .and_then(Value::as_i64)
            .and_then(DateTime::<Utc>::from_timestamp_millis);

        Ok(Self {
            event,
            session_id,
            timestamp,
            body,
        })
    }

    /// Event name as sent by the server
    pub fn name(&self) -> &str {
        self.body
            .get("event")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Recording id carried by recordingStatusChanged events
    pub fn recording_id(&self) -> Option<&str> {
        self.body.get("id").and_then(Value::as_str)
    }

    pub fn recording_status(&self) -> Option<RecordingStatus> {
        self.body
            .get("status")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }
}
