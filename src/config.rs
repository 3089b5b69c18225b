//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::{HistoryPage, DEFAULT_API_BASE};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Where the access token is kept between runs
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
}

fn default_token_file() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join("supermaya").join("token"))
        .unwrap_or_else(|| PathBuf::from(".supermaya_token"))
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_file: default_token_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    HistoryPage::default().limit
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl HistoryConfig {
    /// The `page`-th window (0-based)
    pub fn page(&self, page: u32) -> HistoryPage {
        HistoryPage {
            skip: page.saturating_mul(self.page_size),
            limit: self.page_size,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        for path in Self::default_paths() {
            if path.exists() {
                match Self::load_with_env(&path) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Search order used by [`Config::load_default`]
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("supermaya").join("config.toml")),
            Some(PathBuf::from("./supermaya.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("SUPERMAYA_API_URL") {
            self.api.base_url = url;
        }
        if let Some(path) = var("SUPERMAYA_TOKEN_FILE") {
            self.session.token_file = PathBuf::from(path);
        }
        if let Some(level) = var("SUPERMAYA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("SUPERMAYA_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# SuperMaya Configuration
#
# Environment variables override these settings:
# - SUPERMAYA_API_URL
# - SUPERMAYA_TOKEN_FILE
# - SUPERMAYA_LOG_LEVEL
# - SUPERMAYA_LOG_FORMAT

[api]
# SuperMaya backend base URL
base_url = "http://localhost:8000"

[session]
# File holding the access token after login
# token_file = "~/.config/supermaya/token"

[history]
# Exchanges fetched per history page
page_size = 10

[logging]
# Log level: trace, debug, info, warn, error (RUST_LOG takes precedence)
level = "warn"

# Log format: pretty or json. Logs are written to stderr.
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.history.page_size, 10);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.session.token_file.ends_with("token"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
            [api]
            base_url = "https://maya.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://maya.example.com");
        assert_eq!(config.history.page_size, 10);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_API_BASE);
        assert_eq!(config.history.page_size, 10);
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "SUPERMAYA_API_URL" => Some("http://10.0.0.2:8000".to_string()),
            "SUPERMAYA_TOKEN_FILE" => Some("/tmp/maya-token".to_string()),
            "SUPERMAYA_LOG_FORMAT" => Some("json".to_string()),
            _ => None,
        });

        assert_eq!(config.api.base_url, "http://10.0.0.2:8000");
        assert_eq!(config.session.token_file, PathBuf::from("/tmp/maya-token"));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_load_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        std::fs::write(&path, "[history]\npage_size = \"ten\"").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_history_pages() {
        let history = HistoryConfig { page_size: 5 };
        assert_eq!(history.page(0), HistoryPage { skip: 0, limit: 5 });
        assert_eq!(history.page(2), HistoryPage { skip: 10, limit: 5 });
    }
}
