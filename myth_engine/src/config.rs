//! Engine configuration.
//!
//! Read from `myth.toml` (or the path in `MYTH_CONFIG`). Every field is optional; a missing or
//! broken file is not fatal and just yields the defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::save_files::SaveFormat;

pub const CONFIG_FILE: &str = "myth.toml";
pub const CONFIG_ENV: &str = "MYTH_CONFIG";

/// Runtime settings for the engine binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Compiled world definition (RON).
    pub world_file: PathBuf,
    /// Directory holding save slots.
    pub save_dir: PathBuf,
    pub save_format: SaveFormat,
    /// REPL history file. `None` uses the per-user data directory.
    pub history_file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world_file: PathBuf::from("myth_engine/data/world.ron"),
            save_dir: PathBuf::from("saved_games"),
            save_format: SaveFormat::Ron,
            history_file: None,
        }
    }
}

impl EngineConfig {
    /// History file to use, if any location is available.
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file.clone().or_else(default_history_path)
    }
}

/// Config path from `MYTH_CONFIG`, or `myth.toml` in the working directory.
pub fn config_path() -> PathBuf {
    env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from)
}

/// Load the configuration, falling back to defaults on any error.
pub fn load_config(path: &Path) -> EngineConfig {
    if !path.exists() {
        warn!("no config file at '{}', using defaults", path.display());
        return EngineConfig::default();
    }
    match try_load_config(path) {
        Ok(config) => {
            info!("config loaded from '{}'", path.display());
            config
        },
        Err(e) => {
            warn!("Could not load config from '{}': {e:#}. Using defaults.", path.display());
            EngineConfig::default()
        },
    }
}

/// # Errors
/// Returns an error if the file cannot be read or parsed.
fn try_load_config(path: &Path) -> Result<EngineConfig> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading config from '{}'", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config from '{}'", path.display()))
}

fn default_history_path() -> Option<PathBuf> {
    dirs::data_dir()
        .or_else(dirs::data_local_dir)
        .map(|base| base.join("myth_engine").join("history.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        assert_eq!(load_config(&dir.path().join("myth.toml")), EngineConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("myth.toml");
        fs::write(&path, "save_dir = \"slots\"\nsave_format = \"json\"\n").unwrap();
        let config = load_config(&path);
        assert_eq!(config.save_dir, PathBuf::from("slots"));
        assert_eq!(config.save_format, SaveFormat::Json);
        assert_eq!(config.world_file, EngineConfig::default().world_file);
    }

    #[test]
    fn broken_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("myth.toml");
        fs::write(&path, "save_format = \"xml\"").unwrap();
        assert_eq!(load_config(&path), EngineConfig::default());
    }

    #[test]
    fn explicit_history_file_wins() {
        let config = EngineConfig {
            history_file: Some(PathBuf::from("/tmp/h.txt")),
            ..EngineConfig::default()
        };
        assert_eq!(config.history_path(), Some(PathBuf::from("/tmp/h.txt")));
    }
}
