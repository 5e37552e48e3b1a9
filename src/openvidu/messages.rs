//! JSON shapes exchanged with the OpenVidu REST API

use crate::builders::{
    MediaMode, OutputMode, RecordingLayout, RecordingMode, Role, SessionProperties, TokenOptions,
};
use crate::session::{Connection, Publisher, Session};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn millis(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or_default()
}

/// Body of `POST /openvidu/api/tokens`
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub session: &'a str,
    #[serde(flatten)]
    pub options: &'a TokenOptions,
}

/// Token response; newer servers put the credential in `token`, older ones in `id`
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub id: Option<String>,
    pub token: Option<String>,
}

impl TokenResponse {
    pub fn into_token(self) -> Option<String> {
        self.token.or(self.id).filter(|t| !t.is_empty())
    }
}

/// Session list returned by `GET /openvidu/api/sessions`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionList {
    #[serde(default)]
    pub number_of_elements: usize,
    #[serde(default)]
    pub content: Vec<SessionMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultRecordingMessage {
    pub output_mode: Option<OutputMode>,
    pub recording_layout: Option<RecordingLayout>,
    pub custom_layout: Option<String>,
}

/// A session as serialized by the server
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMessage {
    #[serde(alias = "sessionId")]
    pub id: String,
    #[serde(default)]
    pub created_at: i64,
    pub media_mode: Option<MediaMode>,
    pub recording_mode: Option<RecordingMode>,
    pub default_output_mode: Option<OutputMode>,
    pub default_recording_layout: Option<RecordingLayout>,
    pub default_custom_layout: Option<String>,
    pub default_recording_properties: Option<DefaultRecordingMessage>,
    pub custom_session_id: Option<String>,
    #[serde(default)]
    pub connections: Option<ConnectionList>,
    #[serde(default)]
    pub recording: bool,
}

impl SessionMessage {
    pub fn into_session(self) -> Session {
        let defaults = SessionProperties::default();
        let recording_defaults = self.default_recording_properties.unwrap_or_default();

        let properties = SessionProperties {
            media_mode: self.media_mode.unwrap_or(defaults.media_mode),
            recording_mode: self.recording_mode.unwrap_or(defaults.recording_mode),
            default_output_mode: recording_defaults
                .output_mode
                .or(self.default_output_mode)
                .unwrap_or(defaults.default_output_mode),
            default_recording_layout: recording_defaults
                .recording_layout
                .or(self.default_recording_layout)
                .unwrap_or(defaults.default_recording_layout),
            default_custom_layout: recording_defaults
                .custom_layout
                .or(self.default_custom_layout)
                .filter(|l| !l.is_empty()),
            custom_session_id: self.custom_session_id.filter(|id| !id.is_empty()),
        };

        let session_id = self.id;
        let connections = self
            .connections
            .map(|list| list.content)
            .unwrap_or_default()
            .into_iter()
            .map(|c| c.into_connection(&session_id))
            .collect();

        Session {
            created_at: millis(self.created_at),
            session_id,
            properties,
            connections,
            recording: self.recording,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionList {
    #[serde(default)]
    pub number_of_elements: usize,
    #[serde(default)]
    pub content: Vec<ConnectionMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionMessage {
    #[serde(alias = "connectionId")]
    pub id: String,
    pub session_id: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    pub role: Option<Role>,
    pub token: Option<String>,
    pub location: Option<String>,
    pub platform: Option<String>,
    pub server_data: Option<String>,
    pub client_data: Option<String>,
    #[serde(default)]
    pub publishers: Vec<PublisherMessage>,
    #[serde(default)]
    pub subscribers: Vec<SubscriberMessage>,
}

impl ConnectionMessage {
    pub fn into_connection(self, session_id: &str) -> Connection {
        Connection {
            connection_id: self.id,
            session_id: self.session_id.unwrap_or_else(|| session_id.to_string()),
            created_at: millis(self.created_at),
            role: self.role,
            token: self.token,
            location: self.location,
            platform: self.platform,
            server_data: self.server_data,
            client_data: self.client_data,
            publishers: self.publishers.into_iter().map(PublisherMessage::into_publisher).collect(),
            subscribers: self.subscribers.into_iter().map(|s| s.stream_id).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherMessage {
    pub stream_id: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub media_options: MediaOptionsMessage,
}

impl PublisherMessage {
    fn into_publisher(self) -> Publisher {
        let media = self.media_options;
        Publisher {
            stream_id: self.stream_id,
            created_at: millis(self.created_at),
            has_audio: media.has_audio,
            has_video: media.has_video,
            audio_active: media.audio_active,
            video_active: media.video_active,
            type_of_video: media.type_of_video,
            frame_rate: media.frame_rate,
            video_dimensions: media.video_dimensions,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaOptionsMessage {
    #[serde(default)]
    pub has_audio: bool,
    #[serde(default)]
    pub has_video: bool,
    pub audio_active: Option<bool>,
    pub video_active: Option<bool>,
    pub type_of_video: Option<String>,
    pub frame_rate: Option<f64>,
    pub video_dimensions: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberMessage {
    pub stream_id: String,
}
