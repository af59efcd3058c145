//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the working-directory config file
pub const LOCAL_CONFIG_FILE: &str = ".tuoyu.yaml";

/// Configuration keys with their descriptions
pub const CONFIG_KEYS: &[(&str, &str)] = &[
    (
        "search_endpoint",
        "Endpoint used by remote institution search",
    ),
    ("default_format", "Default output format (yaml, json, table)"),
    (
        "report_template",
        "Path to a custom tera template for `tuoyu report`",
    ),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Survey tooling configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Remote search endpoint override
    pub search_endpoint: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// Custom report template path
    pub report_template: Option<PathBuf>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/tuoyu/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            config.merge_file(&global_path);
        }

        // 3. Working directory config (.tuoyu.yaml)
        if let Some(local_path) = Self::local_config_path() {
            config.merge_file(&local_path);
        }

        // 4. Environment variables
        if let Ok(endpoint) = std::env::var("TUOYU_SEARCH_ENDPOINT") {
            config.search_endpoint = Some(endpoint);
        }
        if let Ok(format) = std::env::var("TUOYU_DEFAULT_FORMAT") {
            config.default_format = Some(format);
        }
        if let Ok(template) = std::env::var("TUOYU_REPORT_TEMPLATE") {
            config.report_template = Some(PathBuf::from(template));
        }

        config
    }

    /// Read a single config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    fn from_yaml(contents: &str) -> Result<Self, String> {
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(contents).map_err(|e| e.to_string())
    }

    fn merge_file(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        match Self::from_file(path) {
            Ok(other) => {
                tracing::debug!(path = %path.display(), "loaded config");
                self.merge(other);
            }
            Err(e) => tracing::warn!("ignoring config: {}", e),
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "tuoyu")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Get the path to the working-directory config file
    pub fn local_config_path() -> Option<PathBuf> {
        std::env::current_dir()
            .ok()
            .map(|dir| dir.join(LOCAL_CONFIG_FILE))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.search_endpoint.is_some() {
            self.search_endpoint = other.search_endpoint;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.report_template.is_some() {
            self.report_template = other.report_template;
        }
    }

    /// Look up a value by key name
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "search_endpoint" => self.search_endpoint.clone(),
            "default_format" => self.default_format.clone(),
            "report_template" => self
                .report_template
                .as_ref()
                .map(|p| p.display().to_string()),
            _ => None,
        }
    }

    /// Whether `key` is a known configuration key
    pub fn is_valid_key(key: &str) -> bool {
        CONFIG_KEYS.iter().any(|(k, _)| *k == key)
    }
}
