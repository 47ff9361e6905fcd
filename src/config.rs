//! Configuration file support for scoreboard
//!
//! Reads from .scoreboard/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Detail server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

/// Where details are fetched from
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// Base URL of the server exposing /targetdetailsjson
    /// Default: "http://localhost:8080"
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds
    /// Default: 10000
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogConfig {
    /// Filter used when RUST_LOG is unset
    /// Default: "info"
    #[serde(default = "default_level")]
    pub level: String,

    /// Log file for the TUI (stderr would corrupt the screen).
    /// Defaults to scoreboard.log in the system temp dir.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

impl Config {
    /// Load config from .scoreboard/config.toml
    /// Returns default config if file doesn't exist or can't be parsed
    pub fn load() -> Self {
        if let Some(path) = Self::find_config_path() {
            match Self::load_from(&path) {
                Ok(config) => return config,
                Err(e) => eprintln!("Ignoring {}: {}", path.display(), e),
            }
        }
        Self::default()
    }

    /// Load a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Find config.toml by walking up directory tree
    fn find_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        Self::find_config_from(&current_dir)
    }

    fn find_config_from(start: &Path) -> Option<PathBuf> {
        let mut dir = start;

        loop {
            let config_path = dir.join(".scoreboard").join("config.toml");
            if config_path.exists() {
                return Some(config_path);
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
        None
    }

    /// Log file path, falling back to the temp dir
    pub fn log_file(&self) -> PathBuf {
        self.log
            .file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("scoreboard.log"))
    }
}
