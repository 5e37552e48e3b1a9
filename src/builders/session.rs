use super::{check_keys, enumerated, string, Options, UnknownKeys};
use super::{OutputMode, RecordingLayout};
use crate::error::Result;
use serde::{Deserialize, Serialize};

option_enum! {
    /// How media flows between participants
    MediaMode {
        Routed => "ROUTED",
        Relayed => "RELAYED",
    }
}

option_enum! {
    /// Whether the server records automatically once a stream is published
    RecordingMode {
        Always => "ALWAYS",
        Manual => "MANUAL",
    }
}

/// Properties sent with a session creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProperties {
    pub media_mode: MediaMode,
    pub recording_mode: RecordingMode,
    pub default_output_mode: OutputMode,
    pub default_recording_layout: RecordingLayout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_custom_layout: Option<String>,
    /// Caller-chosen session id; repeated creates with the same id are idempotent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_session_id: Option<String>,
}

impl Default for SessionProperties {
    fn default() -> Self {
        Self {
            media_mode: MediaMode::Routed,
            recording_mode: RecordingMode::Manual,
            default_output_mode: OutputMode::Composed,
            default_recording_layout: RecordingLayout::BestFit,
            default_custom_layout: None,
            custom_session_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionPropertiesBuilder {
    unknown_keys: UnknownKeys,
}

impl SessionPropertiesBuilder {
    const KEYS: &'static [&'static str] = &[
        "mediaMode",
        "recordingMode",
        "defaultOutputMode",
        "defaultRecordingLayout",
        "defaultCustomLayout",
        "customSessionId",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }

    pub fn build(&self, options: &Options) -> Result<SessionProperties> {
        check_keys(options, Self::KEYS, self.unknown_keys)?;

        let defaults = SessionProperties::default();

        Ok(SessionProperties {
            media_mode: enumerated(options, "mediaMode")?.unwrap_or(defaults.media_mode),
            recording_mode: enumerated(options, "recordingMode")?
                .unwrap_or(defaults.recording_mode),
            default_output_mode: enumerated(options, "defaultOutputMode")?
                .unwrap_or(defaults.default_output_mode),
            default_recording_layout: enumerated(options, "defaultRecordingLayout")?
                .unwrap_or(defaults.default_recording_layout),
            default_custom_layout: string(options, "defaultCustomLayout")?,
            custom_session_id: string(options, "customSessionId")?
                .filter(|id| !id.trim().is_empty()),
        })
    }
}
