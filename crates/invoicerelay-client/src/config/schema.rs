use std::time::Duration;

use serde::Deserialize;
use url::Url;

use invoicerelay_core::error::{RelayError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    pub version: u32,

    #[serde(default)]
    pub channel: ChannelConfig,

    #[serde(default)]
    pub flags: FeatureFlags,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            channel: ChannelConfig::default(),
            flags: FeatureFlags::default(),
        }
    }
}

impl RelayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RelayError::UnsupportedVersion);
        }

        self.channel.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    #[serde(default = "default_base_reconnect_delay_ms")]
    pub base_reconnect_delay_ms: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            base_reconnect_delay_ms: default_base_reconnect_delay_ms(),
        }
    }
}

impl ChannelConfig {
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| RelayError::Config(format!("channel.base_url is not a url: {e}")))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(RelayError::Config(
                "channel.base_url must use ws:// or wss://".into(),
            ));
        }
        if self.max_reconnect_attempts > 32 {
            return Err(RelayError::Config(
                "channel.max_reconnect_attempts must be at most 32".into(),
            ));
        }
        if !(1..=600000).contains(&self.base_reconnect_delay_ms) {
            return Err(RelayError::Config(
                "channel.base_reconnect_delay_ms must be between 1 and 600000".into(),
            ));
        }
        Ok(())
    }

    pub fn base_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.base_reconnect_delay_ms)
    }
}

fn default_base_url() -> String {
    "ws://localhost:8000/ws".into()
}
fn default_max_reconnect_attempts() -> u32 {
    5
}
fn default_base_reconnect_delay_ms() -> u64 {
    1000
}

/// Feature switches handed to whoever needs them. Nothing reads these globally.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureFlags {
    #[serde(default = "enabled")]
    pub realtime: bool,
    #[serde(default = "enabled")]
    pub notifications: bool,
    #[serde(default = "enabled")]
    pub ai_insights: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            realtime: true,
            notifications: true,
            ai_insights: true,
        }
    }
}

fn enabled() -> bool {
    true
}
