use super::{boolean, check_keys, enumerated, required_string, string, Options, UnknownKeys};
use crate::error::{OpenViduError, Result};
use serde::{Deserialize, Serialize};

option_enum! {
    OutputMode {
        Composed => "COMPOSED",
        ComposedQuickStart => "COMPOSED_QUICK_START",
        Individual => "INDIVIDUAL",
    }
}

option_enum! {
    /// Layout used when composing several streams into one video
    RecordingLayout {
        BestFit => "BEST_FIT",
        PictureInPicture => "PICTURE_IN_PICTURE",
        VerticalPresentation => "VERTICAL_PRESENTATION",
        HorizontalPresentation => "HORIZONTAL_PRESENTATION",
        Custom => "CUSTOM",
    }
}

/// Body of a recording start request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingProperties {
    pub session: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub output_mode: OutputMode,
    pub has_audio: bool,
    pub has_video: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_layout: Option<RecordingLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_layout: Option<String>,
    /// `WIDTHxHEIGHT`, e.g. `1280x720`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordingPropertiesBuilder {
    unknown_keys: UnknownKeys,
}

impl RecordingPropertiesBuilder {
    const KEYS: &'static [&'static str] = &[
        "session",
        "sessionId",
        "name",
        "outputMode",
        "hasAudio",
        "hasVideo",
        "recordingLayout",
        "customLayout",
        "resolution",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }

    pub fn build(&self, options: &Options) -> Result<RecordingProperties> {
        check_keys(options, Self::KEYS, self.unknown_keys)?;

        // Both spellings are accepted from callers
        let session = if options.contains_key("sessionId") {
            required_string(options, "sessionId")?
        } else {
            required_string(options, "session")?
        };

        let has_audio = boolean(options, "hasAudio")?.unwrap_or(true);
        let has_video = boolean(options, "hasVideo")?.unwrap_or(true);
        if !has_audio && !has_video {
            return Err(OpenViduError::invalid(
                "hasAudio and hasVideo cannot both be false",
            ));
        }

        let output_mode = enumerated(options, "outputMode")?.unwrap_or(OutputMode::Composed);
        let recording_layout: Option<RecordingLayout> = enumerated(options, "recordingLayout")?;
        let custom_layout = string(options, "customLayout")?;

        let resolution = string(options, "resolution")?;
        if let Some(ref resolution) = resolution {
            validate_resolution(resolution)?;
        }

        Ok(RecordingProperties {
            session,
            name: string(options, "name")?,
            output_mode,
            has_audio,
            has_video,
            recording_layout,
            custom_layout,
            resolution,
        })
    }
}

fn validate_resolution(resolution: &str) -> Result<()> {
    let parsed = resolution
        .split_once('x')
        .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)));

    match parsed {
        Some((width, height)) if width > 0 && height > 0 => Ok(()),
        _ => Err(OpenViduError::invalid(format!(
            "resolution must look like WIDTHxHEIGHT, got {:?}",
            resolution
        ))),
    }
}
