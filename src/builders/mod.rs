//! Option builders
//!
//! Each builder turns an untyped JSON option map (as received from an HTTP
//! caller) into a validated request structure:
//! - `SessionPropertiesBuilder` - session creation
//! - `TokenOptionsBuilder` - token generation
//! - `PublishStreamBuilder` - IP camera / custom stream publishing
//! - `RecordingPropertiesBuilder` - recording start
//! - `SignalPropertiesBuilder` - signal delivery
//!
//! Builders are pure: no I/O, same input gives the same output.

use crate::error::{OpenViduError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

/// Declares a closed set of wire values with parsing and serde support.
macro_rules! option_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, String> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(format!(
                        "expected one of [{}], got {:?}",
                        [$($wire),+].join(", "),
                        other
                    )),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

mod publish;
mod recording;
mod session;
mod signal;
mod token;

pub use publish::{PublishOptions, PublishStreamBuilder, StreamType};
pub use recording::{OutputMode, RecordingLayout, RecordingProperties, RecordingPropertiesBuilder};
pub use session::{MediaMode, RecordingMode, SessionProperties, SessionPropertiesBuilder};
pub use signal::{SignalProperties, SignalPropertiesBuilder};
pub use token::{KurentoOptions, Role, TokenOptions, TokenOptionsBuilder};

/// Raw option bag as received from a caller
pub type Options = serde_json::Map<String, Value>;

/// What a builder does with keys it does not recognise
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeys {
    #[default]
    Ignore,
    Reject,
}

impl UnknownKeys {
    pub fn from_reject_flag(reject: bool) -> Self {
        if reject {
            UnknownKeys::Reject
        } else {
            UnknownKeys::Ignore
        }
    }
}

fn check_keys(options: &Options, known: &[&str], policy: UnknownKeys) -> Result<()> {
    if policy == UnknownKeys::Ignore {
        return Ok(());
    }

    let mut unknown: Vec<&str> = options
        .keys()
        .map(String::as_str)
        .filter(|key| !known.contains(key))
        .collect();

    if unknown.is_empty() {
        return Ok(());
    }

    unknown.sort_unstable();
    Err(OpenViduError::invalid(format!(
        "unknown option(s): {}",
        unknown.join(", ")
    )))
}

fn string(options: &Options, key: &str) -> Result<Option<String>> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(OpenViduError::invalid(format!(
            "{} must be a string, got {}",
            key, other
        ))),
    }
}

/// Present and non-blank string option
fn required_string(options: &Options, key: &str) -> Result<String> {
    match string(options, key)? {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(OpenViduError::invalid(format!("{} is required", key))),
    }
}

fn boolean(options: &Options, key: &str) -> Result<Option<bool>> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(OpenViduError::invalid(format!(
            "{} must be a boolean, got {}",
            key, other
        ))),
    }
}

fn unsigned(options: &Options, key: &str) -> Result<Option<u32>> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                OpenViduError::invalid(format!(
                    "{} must be a non-negative integer, got {}",
                    key, value
                ))
            }),
    }
}

fn string_list(options: &Options, key: &str) -> Result<Vec<String>> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    OpenViduError::invalid(format!("{} must only contain strings", key))
                })
            })
            .collect(),
        Some(other) => Err(OpenViduError::invalid(format!(
            "{} must be an array of strings, got {}",
            key, other
        ))),
    }
}

fn enumerated<T>(options: &Options, key: &str) -> Result<Option<T>>
where
    T: FromStr<Err = String>,
{
    match string(options, key)? {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| OpenViduError::invalid(format!("{}: {}", key, e))),
    }
}

/// Free-form client data: strings pass through, anything else is JSON-encoded
fn data(options: &Options, key: &str) -> Option<String> {
    match options.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}
