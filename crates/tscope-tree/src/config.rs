//! Settings parser for .tscope/config.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use tscope_core::prelude::*;
use tscope_core::ProviderMode;

const CONFIG_FILENAME: &str = "config.toml";
const TSCOPE_DIR: &str = ".tscope";

/// Application settings (.tscope/config.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub driver: DriverSettings,

    #[serde(default)]
    pub view: ViewSettings,

    #[serde(default)]
    pub resources: ResourceSettings,
}

/// Where and how to reach the driver
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DriverSettings {
    #[serde(default = "default_address")]
    pub address: String,

    /// Per-call timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl DriverSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            address: default_address(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ViewSettings {
    #[serde(default)]
    pub mode: ProviderMode,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResourceSettings {
    /// Root of the `light/` and `dark/` icon folders
    #[serde(default = "default_resources_dir")]
    pub dir: PathBuf,
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            dir: default_resources_dir(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:27042".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_resources_dir() -> PathBuf {
    PathBuf::from("resources")
}

/// Path of the settings file under `base`.
pub fn config_path(base: &Path) -> PathBuf {
    base.join(TSCOPE_DIR).join(CONFIG_FILENAME)
}

/// Load settings from `<base>/.tscope/config.toml`.
///
/// A missing or unreadable file yields defaults.
pub fn load_settings(base: &Path) -> Settings {
    let config_path = config_path(base);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Write settings to `<base>/.tscope/config.toml`, creating the directory.
pub fn save_settings(base: &Path, settings: &Settings) -> Result<()> {
    let dir = base.join(TSCOPE_DIR);
    std::fs::create_dir_all(&dir)
        .map_err(|e| Error::config(format!("Failed to create {}: {}", dir.display(), e)))?;

    let content = toml::to_string_pretty(settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {}", e)))?;

    let path = config_path(base);
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Saved settings to {}", path.display());
    Ok(())
}
