use crate::builders::{OutputMode, RecordingLayout};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recording lifecycle as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingStatus {
    Starting,
    Started,
    Stopped,
    Ready,
    Failed,
}

impl RecordingStatus {
    /// True once the server no longer captures media for this recording
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            RecordingStatus::Stopped | RecordingStatus::Ready | RecordingStatus::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordingStatus::Starting => "starting",
            RecordingStatus::Started => "started",
            RecordingStatus::Stopped => "stopped",
            RecordingStatus::Ready => "ready",
            RecordingStatus::Failed => "failed",
        }
    }
}

impl FromStr for RecordingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starting" => Ok(RecordingStatus::Starting),
            "started" => Ok(RecordingStatus::Started),
            "stopped" => Ok(RecordingStatus::Stopped),
            "ready" => Ok(RecordingStatus::Ready),
            "failed" => Ok(RecordingStatus::Failed),
            other => Err(format!("unknown recording status {:?}", other)),
        }
    }
}

impl fmt::Display for RecordingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A server-side capture of a session's media
///
/// Field names match the OpenVidu REST representation, so the same type is
/// used for decoding server responses and for answering callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub id: String,

    /// Owning session
    pub session_id: String,

    #[serde(default)]
    pub name: Option<String>,

    pub output_mode: OutputMode,

    #[serde(default = "default_true")]
    pub has_audio: bool,

    #[serde(default = "default_true")]
    pub has_video: bool,

    #[serde(default)]
    pub recording_layout: Option<RecordingLayout>,

    #[serde(default)]
    pub custom_layout: Option<String>,

    #[serde(default)]
    pub resolution: Option<String>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    /// Size in bytes (0 until the file is written)
    #[serde(default)]
    pub size: u64,

    /// Duration in seconds
    #[serde(default)]
    pub duration: f64,

    /// Storage location once the recording is ready
    #[serde(default)]
    pub url: Option<String>,

    pub status: RecordingStatus,
}

fn default_true() -> bool {
    true
}
