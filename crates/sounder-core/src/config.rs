//! Engine configuration
//!
//! YAML configuration with a defaults fallback: a missing or invalid
//! file never fails startup, it logs and falls back to `Default`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Settings for the sound engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory searched for named sound files and generated notes
    pub sounds_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sounds_dir: PathBuf::from("./sounds"),
        }
    }
}

/// Default config file location: `<user config dir>/sounder/config.yaml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sounder")
        .join("config.yaml")
}

/// Load configuration from a YAML file
///
/// A missing file returns the default config silently; an unreadable
/// or unparseable file logs a warning and returns the default.
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        log::info!("no config at {}, using defaults", path.display());
        return T::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<T>(&contents) {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("failed to parse config: {e}, using defaults");
                T::default()
            }
        },
        Err(e) => {
            log::warn!("failed to read config file: {e}, using defaults");
            T::default()
        }
    }
}

/// Save configuration to a YAML file, creating parent directories
pub fn save_config<T>(config: &T, path: &Path) -> Result<()>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory: {parent:?}"))?;
    }

    let yaml = serde_yaml::to_string(config).context("failed to serialize config to YAML")?;
    std::fs::write(path, yaml).with_context(|| format!("failed to write config file: {path:?}"))?;

    log::info!("saved config to {}", path.display());
    Ok(())
}
