//! Application settings
//!
//! Read-only configuration loaded from a plain JSON file. The explorer never
//! writes it back; endpoints and drafts live only for the current process.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::draft::DEFAULT_CONTENT_TYPE;
use crate::error::{ExplorerError, Result};
use endpoint_parser::DEFAULT_SPEC_PATH;

/// Name of the settings file inside the config directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// Document location relative to each base URL
    pub spec_path: String,
    /// Headers every new draft starts with
    pub default_headers: IndexMap<String, String>,
    /// Timeout for outgoing test requests (none by default)
    pub request_timeout_secs: Option<u64>,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Base URLs to load on startup
    pub base_urls: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut default_headers = IndexMap::new();
        default_headers.insert(DEFAULT_CONTENT_TYPE.0.to_string(), DEFAULT_CONTENT_TYPE.1.to_string());

        Self {
            version: 1,
            spec_path: DEFAULT_SPEC_PATH.to_string(),
            default_headers,
            request_timeout_secs: None,
            log_level: "info".to_string(),
            base_urls: Vec::new(),
        }
    }
}

impl Settings {
    /// Request timeout as a duration
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Settings loader
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Load settings from `settings.json` in the given directory
    ///
    /// A missing file yields the defaults.
    pub fn new(config_dir: &Path) -> Result<Self> {
        Self::from_file(config_dir.join(SETTINGS_FILE))
    }

    /// Load settings from an explicit file path
    pub fn from_file(settings_file: PathBuf) -> Result<Self> {
        let settings = Self::load_from_file(&settings_file)?;
        Ok(Self {
            settings_file,
            settings,
        })
    }

    /// Load settings from the platform config directory
    pub fn from_default_location() -> Result<Self> {
        let dir = Self::default_dir().ok_or_else(|| {
            ExplorerError::Settings("could not determine a config directory".to_string())
        })?;
        Self::new(&dir)
    }

    /// Platform config directory for the explorer
    pub fn default_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "openapi-explorer", "openapi-explorer")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| ExplorerError::Settings(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Path the settings were loaded from
    pub fn settings_file(&self) -> &Path {
        &self.settings_file
    }

    /// Current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Mutable settings, for command-line overrides
    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Consume the manager, keeping the settings
    pub fn into_settings(self) -> Settings {
        self.settings
    }
}
