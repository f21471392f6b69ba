//! Configuration module for tunegrab.
//!
//! Handles loading and parsing the `~/.tunegrab/tunegrabrc` configuration
//! file (`key = value` lines, `#` comments).

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::logging::LogConfig;

/// Default catalog search endpoint.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";

/// Default update-check endpoint (static JSON descriptor).
pub const DEFAULT_UPDATE_ENDPOINT: &str =
    "https://raw.githubusercontent.com/tunegrab/tunegrab/main/update.json";

/// Default maximum number of search results per request.
pub const DEFAULT_MAX_RESULTS: u32 = 20;

/// Default rc file content with all settings documented.
const DEFAULT_RC: &str = r#"# Tunegrab Configuration File
# ===========================
# This file is read on application startup.
# Lines starting with '#' are comments.

# Catalog Configuration
# ---------------------
# search_endpoint = https://www.googleapis.com/youtube/v3/search
# api_key =                  # Catalog API key (required for searching)
# max_results = 20           # Results per search (1-50)

# Updates
# -------
# update_check = true        # Probabilistic update check on startup
# update_endpoint = https://raw.githubusercontent.com/tunegrab/tunegrab/main/update.json

# Downloads
# ---------
# download_dir =             # Defaults to the system download directory

# Logging Configuration
# ---------------------
# Logs are stored in ~/.tunegrab/logs/ with automatic cleanup.
#
# log_enabled = true         # Enable/disable file logging (true/false)
# log_level = info           # Log level: trace, debug, info, warn, error, off
# log_retention = 48         # Hours to keep log files
"#;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Catalog search endpoint.
    pub search_endpoint: String,
    /// Catalog API key, empty when unset.
    pub api_key: String,
    /// Maximum search results per request.
    pub max_results: u32,
    /// Whether the startup update check is enabled.
    pub update_check: bool,
    /// Update-check endpoint.
    pub update_endpoint: String,
    /// Download directory override, `None` means the system default.
    pub download_dir: Option<PathBuf>,
    /// Path to the rc file.
    pub config_path: PathBuf,
    /// Logging configuration.
    pub log_config: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            api_key: String::new(),
            max_results: DEFAULT_MAX_RESULTS,
            update_check: true,
            update_endpoint: DEFAULT_UPDATE_ENDPOINT.to_string(),
            download_dir: None,
            config_path: Self::default_config_path(),
            log_config: LogConfig::default(),
        }
    }
}

impl Config {
    /// Returns the default rc file path (`~/.tunegrab/tunegrabrc`).
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tunegrab")
            .join("tunegrabrc")
    }

    /// Loads configuration from the default path, creating it if missing.
    ///
    /// # Errors
    /// Returns error if the rc file cannot be read or created.
    pub fn load() -> io::Result<Self> {
        let path = Self::default_config_path();
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    ///
    /// # Errors
    /// Returns error if the rc file cannot be read or created.
    pub fn load_from(path: &PathBuf) -> io::Result<Self> {
        if !path.exists() {
            Self::create_default_config(path)?;
        }

        let content = fs::read_to_string(path)?;
        let mut config = Self {
            config_path: path.clone(),
            ..Self::default()
        };
        config.parse(&content);

        Ok(config)
    }

    /// Returns the effective download directory.
    #[must_use]
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| {
            dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
        })
    }

    /// Creates the default rc file.
    fn create_default_config(path: &PathBuf) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_RC.as_bytes())?;
        Ok(())
    }

    /// Parses rc file content.
    fn parse(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();

                // Remove inline comments
                let value = value.split('#').next().unwrap_or(value).trim();

                self.apply_setting(key, value);
            }
        }
    }

    /// Applies a single setting.
    fn apply_setting(&mut self, key: &str, value: &str) {
        match key {
            "search_endpoint" => {
                if !value.is_empty() {
                    self.search_endpoint = value.to_string();
                }
            }
            "api_key" => {
                self.api_key = value.to_string();
            }
            "max_results" => {
                if let Ok(n) = value.parse::<u32>() {
                    self.max_results = n.clamp(1, 50);
                }
            }
            "update_check" => {
                self.update_check = parse_bool(value);
            }
            "update_endpoint" => {
                if !value.is_empty() {
                    self.update_endpoint = value.to_string();
                }
            }
            "download_dir" => {
                if !value.is_empty() {
                    self.download_dir = Some(PathBuf::from(value));
                }
            }
            "log_enabled" => {
                self.log_config.enabled = parse_bool(value);
            }
            "log_level" => {
                self.log_config.level = LogConfig::parse_level(value);
            }
            "log_retention" => {
                self.log_config.retention_hours = LogConfig::parse_retention(value);
            }
            _ => {}
        }
    }
}

/// Parses a boolean setting value.
fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "yes" | "1" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.search_endpoint, DEFAULT_SEARCH_ENDPOINT);
        assert_eq!(config.max_results, DEFAULT_MAX_RESULTS);
        assert!(config.update_check);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_parse_settings() {
        let mut config = Config::default();
        config.parse(
            "# comment\n\
             api_key = abc123\n\
             max_results = 5   # inline comment\n\
             update_check = false\n\
             download_dir = /tmp/music\n\
             log_level = debug\n",
        );

        assert_eq!(config.api_key, "abc123");
        assert_eq!(config.max_results, 5);
        assert!(!config.update_check);
        assert_eq!(config.download_dir, Some(PathBuf::from("/tmp/music")));
        assert_eq!(config.log_config.level, "debug");
    }

    #[test]
    fn test_max_results_clamped() {
        let mut config = Config::default();
        config.parse("max_results = 500\n");
        assert_eq!(config.max_results, 50);

        config.parse("max_results = 0\n");
        assert_eq!(config.max_results, 1);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let mut config = Config::default();
        config.parse("max_results = lots\nsearch_endpoint =\n");
        assert_eq!(config.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(config.search_endpoint, DEFAULT_SEARCH_ENDPOINT);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("tunegrabrc");

        let config = Config::load_from(&path).expect("load");
        assert!(path.exists());
        assert_eq!(config.max_results, DEFAULT_MAX_RESULTS);
    }
}
