use crate::builders::UnknownKeys;
use anyhow::{bail, Result};
use serde::Deserialize;
use std::time::Duration;

/// Environment variables override file values, e.g. `OPENVIDU_BRIDGE__OPENVIDU__SECRET`
pub const ENV_PREFIX: &str = "OPENVIDU_BRIDGE";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub openvidu: OpenViduConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenViduConfig {
    /// Base URL of the OpenVidu server, e.g. `https://media.example.com`
    pub url: String,
    #[serde(default = "default_username")]
    pub username: String,
    pub secret: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Reject option maps carrying keys the builders do not know
    #[serde(default)]
    pub reject_unknown_options: bool,
}

impl OpenViduConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn unknown_keys(&self) -> UnknownKeys {
        UnknownKeys::from_reject_flag(self.reject_unknown_options)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Seconds a per-session delivery lane stays alive without events
    #[serde(default = "default_lane_idle_secs")]
    pub lane_idle_secs: u64,
}

impl WebhookConfig {
    pub fn lane_idle(&self) -> Duration {
        Duration::from_secs(self.lane_idle_secs)
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            lane_idle_secs: default_lane_idle_secs(),
        }
    }
}

fn default_username() -> String {
    "OPENVIDUAPP".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_lane_idle_secs() -> u64 {
    30
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Config = settings.try_deserialize()?;
        cfg.validate()?;

        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.openvidu.url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("openvidu.url must be an http(s) URL, got {:?}", url);
        }
        if self.openvidu.secret.is_empty() {
            bail!("openvidu.secret must not be empty");
        }
        if self.openvidu.timeout_secs == 0 {
            bail!("openvidu.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}
