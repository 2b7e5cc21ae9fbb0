//! Process configuration
//!
//! Loaded in three layers:
//! 1. compiled defaults ([`Config::default()`])
//! 2. an optional JSON file (missing sections fall back to defaults)
//! 3. `LCD_EVENTS_*` environment overrides

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::display::FlashPosition;
use crate::error::{Error, Result};

/// Environment variable overriding `websocket.host`
pub const ENV_WS_HOST: &str = "LCD_EVENTS_WS_HOST";
/// Environment variable overriding `websocket.endpoint`
pub const ENV_WS_ENDPOINT: &str = "LCD_EVENTS_WS_ENDPOINT";
/// Environment variable overriding `websocket.listen_address`
pub const ENV_WS_LISTEN: &str = "LCD_EVENTS_WS_LISTEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub websocket: WebsocketConfig,
    pub display: DisplayConfig,
}

/// Options recognized by the websocket broadcast consumer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebsocketConfig {
    /// Host (and port) browsers use to reach the feed, e.g. `pi.local:8080`
    pub host: String,

    /// Path serving the dashboard page
    pub endpoint: String,

    /// Socket address the HTTP server binds
    pub listen_address: String,

    /// Outbound frames queued per connection before broadcast waits
    pub client_queue: usize,
}

impl Default for WebsocketConfig {
    fn default() -> Self {
        Self {
            host: "localhost:8080".to_string(),
            endpoint: "/".to_string(),
            listen_address: "0.0.0.0:8080".to_string(),
            client_queue: 64,
        }
    }
}

/// Defaults applied to events that don't spell out their presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub duration_ms: u64,
    pub flash: FlashPosition,
    pub flash_repetitions: u32,
    /// Half period of one flash toggle
    pub flash_interval_ms: u64,
    pub clear_after: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            duration_ms: 2000,
            flash: FlashPosition::None,
            flash_repetitions: 3,
            flash_interval_ms: 250,
            clear_after: true,
        }
    }
}

impl DisplayConfig {
    pub fn flash_interval(&self) -> Duration {
        Duration::from_millis(self.flash_interval_ms)
    }

    /// Default hold as the signed value display requests are built from
    pub fn default_duration_ms(&self) -> Result<i64> {
        i64::try_from(self.duration_ms).map_err(|_| {
            Error::Config(format!("display duration_ms {} is out of range", self.duration_ms))
        })
    }
}

impl Config {
    /// Load configuration, reading `path` when given and applying env overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid {}: {}", path.display(), e)))
    }

    /// Apply overrides from a variable lookup (normally the process environment)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_WS_HOST) {
            self.websocket.host = host;
        }
        if let Some(endpoint) = lookup(ENV_WS_ENDPOINT) {
            self.websocket.endpoint = endpoint;
        }
        if let Some(listen) = lookup(ENV_WS_LISTEN) {
            self.websocket.listen_address = listen;
        }
    }
}
