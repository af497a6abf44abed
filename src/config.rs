//! Runtime settings, read from a JSON file.
//!
//! Every field has a default, so a settings file only needs the values it
//! changes:
//!
//! ```json
//! { "assetRoot": "content", "logLevel": "debug" }
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Directory bundled asset names are resolved against.
    pub asset_root: String,
    /// World file loaded at startup, relative to the asset root unless it is a
    /// file path.
    pub world: String,
    /// How long portals stay inactive after a transition.
    pub portal_cooldown_millis: u64,
    /// Default log filter; `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            asset_root: "assets".to_string(),
            world: "worlds/demo_world.json".to_string(),
            portal_cooldown_millis: 2000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read settings from {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    /// Defaults overlaid with `path` if it exists. An invalid file is reported
    /// and ignored.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("Settings loaded from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{:#}. Keeping default settings", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Could not write settings to {}", path.display()))
    }

    pub fn portal_cooldown(&self) -> instant::Duration {
        instant::Duration::from_millis(self.portal_cooldown_millis)
    }
}
