//! Configuration file support.
//!
//! Hosts tune how tables are recognised and created: the column names that
//! carry colors in dBase sidecars, the names given to new color fields and
//! the log verbosity. The configuration is stored as versioned JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    ALPHA_FIELD_NAMES, ALTERNATE_RGB_FIELD_NAMES, COLOR_FIELD_NAMES, DEFAULT_RGB_FIELD_NAMES,
};
use crate::error::RatError;
use crate::format::{DbfReadOptions, write_atomic};

/// Log verbosity, stored lowercase in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Install `env_logger` at `level`. `RUST_LOG` still refines per module.
///
/// Returns false when a logger was already installed.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging(level: LogLevel) -> bool {
    env_logger::Builder::from_default_env()
        .filter_level(level.into())
        .try_init()
        .is_ok()
}

/// Format version written by this build; files with a higher version are
/// rejected.
pub const CONFIG_VERSION: u32 = 1;

const CONFIG_DIR_NAME: &str = "raster-rat";
const CONFIG_FILE_NAME: &str = "raster-rat.json";

/// Table handling configuration that hosts can export and import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Red, green and blue column names tried first in dBase sidecars
    #[serde(default = "default_rgb_field_names")]
    pub rgb_field_names: [String; 3],

    /// Fallback red, green and blue column names
    #[serde(default = "default_alternate_rgb_field_names")]
    pub alternate_rgb_field_names: [String; 3],

    /// Alpha column names, tried in order
    #[serde(default = "default_alpha_field_names")]
    pub alpha_field_names: Vec<String>,

    /// Names of the R, G, B, A fields created by color insertion
    #[serde(default = "default_color_field_names")]
    pub color_field_names: [String; 4],
}

fn default_rgb_field_names() -> [String; 3] {
    DEFAULT_RGB_FIELD_NAMES.map(String::from)
}

fn default_alternate_rgb_field_names() -> [String; 3] {
    ALTERNATE_RGB_FIELD_NAMES.map(String::from)
}

fn default_alpha_field_names() -> Vec<String> {
    ALPHA_FIELD_NAMES.iter().map(|s| s.to_string()).collect()
}

fn default_color_field_names() -> [String; 4] {
    COLOR_FIELD_NAMES.map(String::from)
}

impl RatConfig {
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            log_level: LogLevel::default(),
            rgb_field_names: default_rgb_field_names(),
            alternate_rgb_field_names: default_alternate_rgb_field_names(),
            alpha_field_names: default_alpha_field_names(),
            color_field_names: default_color_field_names(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a configuration, rejecting files written by a newer version.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// dBase read options matching the configured column names.
    pub fn dbf_read_options(&self) -> DbfReadOptions {
        let mut rgb_names = vec![self.rgb_field_names.clone()];
        if self.alternate_rgb_field_names != self.rgb_field_names {
            rgb_names.push(self.alternate_rgb_field_names.clone());
        }
        DbfReadOptions {
            rgb_names,
            alpha_names: self.alpha_field_names.clone(),
        }
    }

    /// `<config dir>/raster-rat/raster-rat.json`, falling back to
    /// `~/.config` when the platform has no config directory.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        let base = dirs::config_dir().or_else(|| dirs::home_dir().map(|home| home.join(".config")))?;
        Some(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Read a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write a configuration file, creating its directory when needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_atomic(path, self.to_json()?.as_bytes())?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load the configuration at [`RatConfig::default_path`].
    ///
    /// A missing file is not an error; unreadable files are logged and
    /// ignored so hosts fall back to the defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.is_file() {
            log::debug!("No configuration at {:?}", path);
            return None;
        }
        Self::load(&path)
            .inspect(|_| log::info!("Loaded configuration from {:?}", path))
            .inspect_err(|e| log::warn!("Ignoring configuration {:?}: {}", path, e))
            .ok()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save(&path)
    }
}

impl Default for RatConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors reading or writing a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    #[error("No configuration directory on this platform")]
    NoConfigDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Write(#[from] RatError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let mut config = RatConfig::new();
        config.log_level = LogLevel::Debug;
        config.rgb_field_names = ["Rouge".into(), "Vert".into(), "Bleu".into()];

        let json = config.to_json().expect("Failed to serialize");
        let loaded = RatConfig::from_json(&json).expect("Failed to deserialize");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_version_too_new() {
        let json = format!(r#"{{ "version": {} }}"#, CONFIG_VERSION + 1);
        let result = RatConfig::from_json(&json);
        assert!(matches!(result, Err(ConfigError::VersionTooNew { .. })));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = RatConfig::from_json(r#"{ "version": 1, "log_level": "warn" }"#).unwrap();
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.color_field_names, COLOR_FIELD_NAMES.map(String::from));
        assert_eq!(config.alpha_field_names, vec!["A", "ALPHA"]);
    }

    #[test]
    fn test_dbf_read_options() {
        let options = RatConfig::new().dbf_read_options();
        assert_eq!(options.rgb_names.len(), 2);
        assert_eq!(options.rgb_names[0], ["R", "G", "B"].map(String::from));
        assert_eq!(options.rgb_names[1], ["RED", "GREEN", "BLUE"].map(String::from));

        let mut config = RatConfig::new();
        config.alternate_rgb_field_names = config.rgb_field_names.clone();
        assert_eq!(config.dbf_read_options().rgb_names.len(), 1);
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(log::LevelFilter::from(LogLevel::Trace), log::LevelFilter::Trace);
        assert_eq!(log::LevelFilter::from(LogLevel::default()), log::LevelFilter::Info);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = RatConfig::new();
        config.color_field_names = ["Red", "Green", "Blue", "Alpha"].map(String::from);
        config.save(&path).unwrap();
        assert_eq!(RatConfig::load(&path).unwrap(), config);

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(RatConfig::load(&path), Err(ConfigError::Json(_))));
        assert!(matches!(
            RatConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
