//! Configuration loading and types

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use packwatch_core::Settings;

/// Top-level configuration for the packwatch daemon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Process-level settings
    #[serde(default)]
    pub daemon: DaemonConfig,
    /// Checker, source and sink settings
    #[serde(flatten)]
    pub settings: Settings,
}

/// Process-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Log level (trace, debug, info, warn, error), overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from file, falling back to defaults when it cannot be
    /// read or parsed
    ///
    /// The load error is handed back so it can be reported once logging is up.
    pub fn load_or_default(path: &Path) -> (Self, Option<eyre::Report>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Find a config file in the usual places
    pub fn discover() -> Option<PathBuf> {
        // Check environment variable
        if let Ok(path) = std::env::var("PACKWATCH_CONFIG") {
            return Some(PathBuf::from(path));
        }

        let paths = [
            Some(PathBuf::from("packwatch.toml")),
            Some(PathBuf::from("/etc/packwatch/packwatch.toml")),
            dirs::config_dir().map(|p| p.join("packwatch/packwatch.toml")),
        ];

        paths.into_iter().flatten().find(|path| path.exists())
    }
}
