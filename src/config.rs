use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading an explicit configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

/// Search behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a search is dispatched.
    pub debounce_ms: u64,
    /// Source assumed for reference clicks that carry none, keyed by
    /// reference kind (`monster`, `spell`, ...).
    pub default_reference_sources: HashMap<String, String>,
    /// Source for kinds missing from `default_reference_sources`.
    pub fallback_source: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridable with `RUST_LOG`.
    pub level: String,
    /// Override the log file directory.
    pub directory: Option<PathBuf>,
    /// Also log human-readable output to stdout.
    pub stdout: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let mut default_reference_sources = HashMap::new();
        default_reference_sources.insert("monster".to_string(), "MM".to_string());
        default_reference_sources.insert("creature".to_string(), "MM".to_string());
        Self {
            debounce_ms: 300,
            default_reference_sources,
            fallback_source: "PHB".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            stdout: true,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Source to assume for a reference of `kind` that names none.
    pub fn default_source_for(&self, kind: &str) -> &str {
        self.default_reference_sources
            .get(kind)
            .map(String::as_str)
            .unwrap_or(&self.fallback_source)
    }
}

impl LoggingConfig {
    /// Resolved log directory (override or platform data dir).
    pub fn log_dir(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|d| d.join("tomekeeper").join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs"))
        })
    }
}

impl ClientConfig {
    /// Load configuration from `~/.config/tomekeeper/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match Self::load_from(&config_path) {
            Ok(config) => {
                log::info!("Loaded config from {}", config_path.display());
                config
            }
            Err(ConfigError::Read { .. }) => {
                log::debug!("No config file at {}, using defaults", config_path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("tomekeeper").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
