use crate::builders::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A participant's joined state within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub connection_id: String,

    /// Owning session
    pub session_id: String,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    /// Absent for server-side published (IP camera) connections
    pub role: Option<Role>,

    pub token: Option<String>,

    pub location: Option<String>,

    pub platform: Option<String>,

    /// Data attached when the token was generated
    pub server_data: Option<String>,

    /// Data attached by the client when joining
    pub client_data: Option<String>,

    /// Streams published by this connection
    pub publishers: Vec<Publisher>,

    /// Stream ids this connection is subscribed to
    pub subscribers: Vec<String>,
}

impl Connection {
    pub fn publishes(&self, stream_id: &str) -> bool {
        self.publishers.iter().any(|p| p.stream_id == stream_id)
    }
}

/// A stream published into a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publisher {
    pub stream_id: String,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    pub has_audio: bool,

    pub has_video: bool,

    pub audio_active: Option<bool>,

    pub video_active: Option<bool>,

    /// CAMERA, SCREEN, CUSTOM or IPCAM as reported by the server
    pub type_of_video: Option<String>,

    pub frame_rate: Option<f64>,

    pub video_dimensions: Option<String>,
}
