// Configuration loading

use crate::views::{CALENDAR_PREVIEW, RECENT_LIMIT, UPCOMING_LIMIT};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CONFIG_FILE: &str = "taskhub.yml";
const APP_DIR: &str = "taskhub";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding persisted tasks
    pub data_dir: PathBuf,
    /// Tasks shown on the dashboard's upcoming list
    pub upcoming_limit: usize,
    /// Tasks shown on the dashboard's recent list
    pub recent_limit: usize,
    /// Task titles shown per calendar day before "+N more"
    pub calendar_preview: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            upcoming_limit: UPCOMING_LIMIT,
            recent_limit: RECENT_LIMIT,
            calendar_preview: CALENDAR_PREVIEW,
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist and parse. Otherwise the per-user config
    /// file is used when present, and built-in defaults when not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Config =
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse config file {:?}", path))?;
        info!(path = ?path, data_dir = ?config.data_dir, "Loaded config");
        Ok(config)
    }
}

/// `<config dir>/taskhub/taskhub.yml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// `<data dir>/taskhub`, or `.taskhub` in the working directory as a fallback
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".taskhub"))
}
