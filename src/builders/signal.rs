use super::{check_keys, data, required_string, string, string_list, Options, UnknownKeys};
use crate::error::{OpenViduError, Result};
use serde::{Deserialize, Serialize};

/// A fire-and-forget message routed through a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalProperties {
    pub session: String,
    /// Target connection ids; empty means broadcast to the whole session
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl SignalProperties {
    pub fn is_broadcast(&self) -> bool {
        self.to.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SignalPropertiesBuilder {
    unknown_keys: UnknownKeys,
}

impl SignalPropertiesBuilder {
    const KEYS: &'static [&'static str] = &["session", "to", "type", "data"];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }

    pub fn build(&self, options: &Options) -> Result<SignalProperties> {
        if options.is_empty() {
            return Err(OpenViduError::invalid("signal payload is empty"));
        }
        check_keys(options, Self::KEYS, self.unknown_keys)?;

        let to = string_list(options, "to")?;
        if to.iter().any(|id| id.trim().is_empty()) {
            return Err(OpenViduError::invalid("to must not contain blank connection ids"));
        }

        Ok(SignalProperties {
            session: required_string(options, "session")?,
            to,
            kind: string(options, "type")?,
            data: data(options, "data"),
        })
    }
}
