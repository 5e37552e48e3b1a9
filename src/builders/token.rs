use super::{check_keys, data, enumerated, string_list, unsigned, Options, UnknownKeys};
use crate::error::{OpenViduError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

option_enum! {
    /// Permissions granted to the participant redeeming a token
    Role {
        Subscriber => "SUBSCRIBER",
        Publisher => "PUBLISHER",
        Moderator => "MODERATOR",
    }
}

/// Kurento media server limits attached to a token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KurentoOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_max_recv_bandwidth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_min_recv_bandwidth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_max_send_bandwidth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_min_send_bandwidth: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_filters: Vec<String>,
}

impl KurentoOptions {
    fn is_empty(&self) -> bool {
        *self == KurentoOptions::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenOptions {
    pub role: Role,
    /// Opaque metadata handed to other participants
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kurento_options: Option<KurentoOptions>,
}

impl Default for TokenOptions {
    fn default() -> Self {
        Self {
            role: Role::Publisher,
            data: None,
            kurento_options: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokenOptionsBuilder {
    unknown_keys: UnknownKeys,
}

impl TokenOptionsBuilder {
    const KEYS: &'static [&'static str] = &["role", "data", "kurentoOptions"];

    const KURENTO_KEYS: &'static [&'static str] = &[
        "videoMaxRecvBandwidth",
        "videoMinRecvBandwidth",
        "videoMaxSendBandwidth",
        "videoMinSendBandwidth",
        "allowedFilters",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }

    pub fn build(&self, options: &Options) -> Result<TokenOptions> {
        check_keys(options, Self::KEYS, self.unknown_keys)?;

        let kurento_options = match options.get("kurentoOptions") {
            None | Some(Value::Null) => None,
            Some(Value::Object(raw)) => Some(self.build_kurento(raw)?),
            Some(other) => {
                return Err(OpenViduError::invalid(format!(
                    "kurentoOptions must be an object, got {}",
                    other
                )))
            }
        };

        Ok(TokenOptions {
            role: enumerated(options, "role")?.unwrap_or(Role::Publisher),
            data: data(options, "data"),
            kurento_options: kurento_options.filter(|k| !k.is_empty()),
        })
    }

    fn build_kurento(&self, raw: &Options) -> Result<KurentoOptions> {
        check_keys(raw, Self::KURENTO_KEYS, self.unknown_keys)?;

        Ok(KurentoOptions {
            video_max_recv_bandwidth: unsigned(raw, "videoMaxRecvBandwidth")?,
            video_min_recv_bandwidth: unsigned(raw, "videoMinRecvBandwidth")?,
            video_max_send_bandwidth: unsigned(raw, "videoMaxSendBandwidth")?,
            video_min_send_bandwidth: unsigned(raw, "videoMinSendBandwidth")?,
            allowed_filters: string_list(raw, "allowedFilters")?,
        })
    }
}
