//! Remote configuration schema and loader
//!
//! Configuration is stored as YAML. Default location:
//! ~/.config/hue-remote/remotes.yaml

use crate::color_temp::ColorTempLadder;
use crate::mapping::MappingRule;
use crate::types::{LightTarget, ZoneRef};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemotesConfig {
    /// One profile per physical remote
    pub remotes: Vec<RemoteProfile>,
}

impl RemotesConfig {
    /// Find a remote by name (case-insensitive)
    pub fn remote(&self, name: &str) -> Option<&RemoteProfile> {
        self.remotes
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }
}

/// Settings for one remote
///
/// The whole profile is the configuration snapshot an event is processed
/// against; replacing it goes through `RemoteCore::reconfigure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteProfile {
    /// Human-readable remote name, used in logs and zone event lines
    pub name: String,

    /// Minimum hold duration for an on/off long press (seconds)
    pub hold_threshold_secs: f64,

    /// Dim step for short up/down presses (percent)
    pub short_dim_step: i64,

    /// Dim step per hold tick (percent, at least 1 is applied)
    pub hold_dim_step: u8,

    /// Color temperature ladder for the on-button cycle
    pub color_temp: ColorTempLadder,

    /// Automation zone this remote overrides, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation_zone: Option<ZoneRef>,

    /// Lamps and groups controlled by this remote
    pub targets: Vec<LightTarget>,

    /// Ordered button map; empty means the built-in fallback applies
    pub button_map: Vec<MappingRule>,

    /// Install the default profile at startup when `button_map` is empty
    pub enable_default_profile: bool,
}

impl Default for RemoteProfile {
    fn default() -> Self {
        Self {
            name: "remote".to_string(),
            hold_threshold_secs: 2.0,
            short_dim_step: 20,
            hold_dim_step: 3,
            color_temp: ColorTempLadder::default(),
            automation_zone: None,
            targets: Vec::new(),
            button_map: Vec::new(),
            enable_default_profile: true,
        }
    }
}

/// Get the default config file path
///
/// Returns: ~/.config/hue-remote/remotes.yaml
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hue-remote")
        .join("remotes.yaml")
}

/// Load configuration from a YAML file
///
/// If the file doesn't exist, returns an empty config (no remotes).
/// If the file exists but is invalid, logs a warning and returns empty config.
pub fn load_config(path: &Path) -> RemotesConfig {
    log::info!("load_config: Loading from {:?}", path);

    if !path.exists() {
        log::info!("load_config: Config file doesn't exist, no remotes configured");
        return RemotesConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<RemotesConfig>(&contents) {
            Ok(config) => {
                log::info!("load_config: Loaded {} remote(s)", config.remotes.len());
                for remote in &config.remotes {
                    log::info!(
                        "  - {} ({} targets, {} rules, zone: {:?})",
                        remote.name,
                        remote.targets.len(),
                        remote.button_map.len(),
                        remote.automation_zone
                    );
                }
                config
            }
            Err(e) => {
                log::warn!("load_config: Failed to parse config: {}", e);
                RemotesConfig::default()
            }
        },
        Err(e) => {
            log::warn!("load_config: Failed to read config file: {}", e);
            RemotesConfig::default()
        }
    }
}

/// Save configuration to a YAML file
///
/// Creates parent directories if they don't exist.
pub fn save_config(config: &RemotesConfig, path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    log::info!("save_config: Saving to {:?}", path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize remote config to YAML")?;

    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write remote config file: {:?}", path))?;

    log::info!("save_config: Config saved successfully");
    Ok(())
}
