use super::{boolean, check_keys, data, required_string, string, unsigned, Options, UnknownKeys};
use crate::error::{OpenViduError, Result};
use serde::{Deserialize, Serialize};

option_enum! {
    StreamType {
        Camera => "CAMERA",
        Screen => "SCREEN",
        Custom => "CUSTOM",
    }
}

/// Server-side publish of an externally sourced stream (e.g. an IP camera)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOptions {
    pub rtsp_uri: String,
    pub type_of_video: StreamType,
    #[serde(rename = "adaptativeBitrate")]
    pub adaptive_bitrate: bool,
    pub only_play_with_subscribers: bool,
    /// Milliseconds of buffering applied by the media server
    pub network_cache: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PublishStreamBuilder {
    unknown_keys: UnknownKeys,
}

impl PublishStreamBuilder {
    const KEYS: &'static [&'static str] = &[
        "rtspUri",
        "typeOfVideo",
        "adaptativeBitrate",
        "onlyPlayWithSubscribers",
        "networkCache",
        "data",
    ];

    pub const DEFAULT_NETWORK_CACHE_MS: u32 = 2000;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }

    pub fn build(&self, options: &Options) -> Result<PublishOptions> {
        check_keys(options, Self::KEYS, self.unknown_keys)?;

        let type_of_video = match string(options, "typeOfVideo")? {
            None => StreamType::Custom,
            Some(raw) => raw
                .parse::<StreamType>()
                .map_err(|_| OpenViduError::StreamTypeInvalid(raw))?,
        };

        Ok(PublishOptions {
            rtsp_uri: required_string(options, "rtspUri")?,
            type_of_video,
            adaptive_bitrate: boolean(options, "adaptativeBitrate")?.unwrap_or(true),
            only_play_with_subscribers: boolean(options, "onlyPlayWithSubscribers")?
                .unwrap_or(true),
            network_cache: unsigned(options, "networkCache")?
                .unwrap_or(Self::DEFAULT_NETWORK_CACHE_MS),
            data: data(options, "data"),
        })
    }
}
