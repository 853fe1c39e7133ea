use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Top-level config (skynet.toml + SKYNET_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkynetConfig {
    #[serde(default)]
    pub inbound: InboundConfig,
}

/// How inbound message metadata is rendered into the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundConfig {
    /// Representation of epoch-millis timestamps (`forwarded_date`, history).
    #[serde(default)]
    pub timestamp_style: TimestampStyle,
    /// Keep only the most recent N history entries. Unset = render all.
    #[serde(default)]
    pub history_limit: Option<usize>,
    /// Emit the separate "Sender" block alongside conversation info.
    #[serde(default = "bool_true")]
    pub include_sender_profile: bool,
}

impl Default for InboundConfig {
    fn default() -> Self {
        Self {
            timestamp_style: TimestampStyle::default(),
            history_limit: None,
            include_sender_profile: true,
        }
    }
}

/// Timestamp rendering inside prompt metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampStyle {
    /// `2024-01-23T08:53:20.000Z`
    #[default]
    Iso8601,
    /// `Tue 2024-01-23 08:53 UTC`
    Human,
}

fn bool_true() -> bool {
    true
}

impl SkynetConfig {
    /// Load config from a TOML file with SKYNET_* env var overrides.
    ///
    /// Nested keys use a double underscore:
    /// `SKYNET_INBOUND__HISTORY_LIMIT=20` sets `inbound.history_limit`.
    /// A missing file is not an error; every key has a default.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);
        debug!(path = %path, "loading config");

        let config: SkynetConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("SKYNET_").split("__"))
            .extract()
            .map_err(|e| crate::error::SkynetError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.skynet/skynet.toml", home)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
