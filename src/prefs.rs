//! Persistent preference flag store.
//!
//! Remembers boolean flags across process lifetimes, most notably the
//! "ignore this update" flags keyed by version code. Persists to
//! `~/.tunegrab/prefs.toml`.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Maximum file size for the preference file (64KB).
const MAX_FILE_SIZE: u64 = 64 * 1024;

/// Key prefix for update ignore flags.
const IGNORE_KEY_PREFIX: &str = "ignoring";

/// Preference store errors.
#[derive(Debug, Error)]
pub enum PrefsError {
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// TOML parsing error.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("Serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// File too large.
    #[error("Preference file too large (max {MAX_FILE_SIZE} bytes)")]
    FileTooLarge,
}

/// On-disk shape of the preference file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PrefsFile {
    /// Boolean flags keyed by name.
    #[serde(default)]
    flags: BTreeMap<String, bool>,
}

/// Persistent boolean flag store.
#[derive(Debug)]
pub struct PrefStore {
    /// Path to the preference file.
    path: PathBuf,
    /// In-memory flags, mirrored to disk on every put.
    flags: BTreeMap<String, bool>,
}

impl PrefStore {
    /// Creates a store backed by the default path and loads existing flags.
    ///
    /// Default path: `~/.tunegrab/prefs.toml`. A missing or unreadable file
    /// yields an empty store; a write error later is surfaced by `put`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_path(Self::default_path())
    }

    /// Creates a store backed by a custom path and loads existing flags.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        assert!(!path.as_os_str().is_empty(), "path must not be empty");

        let flags = match Self::load_file(&path) {
            Ok(flags) => flags,
            Err(e) => {
                warn!("[PREFS] Failed to load {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self { path, flags }
    }

    /// Returns the default preference file path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tunegrab")
            .join("prefs.toml")
    }

    /// Returns the preference file path.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Reads a flag, returning `default` when the key is unset.
    #[must_use]
    pub fn get(&self, key: &str, default: bool) -> bool {
        self.flags.get(key).copied().unwrap_or(default)
    }

    /// Sets a flag and persists the store.
    pub fn put(&mut self, key: &str, value: bool) -> Result<(), PrefsError> {
        assert!(!key.is_empty(), "key must not be empty");

        self.flags.insert(key.to_string(), value);
        self.save()
    }

    /// Returns the ignore-flag key for a version code.
    #[must_use]
    pub fn ignore_key(version_code: u32) -> String {
        format!("{}{}", IGNORE_KEY_PREFIX, version_code)
    }

    /// Returns true if updates to this version code were ignored.
    #[must_use]
    pub fn is_ignoring(&self, version_code: u32) -> bool {
        self.get(&Self::ignore_key(version_code), false)
    }

    /// Persists the ignore flag for a version code.
    pub fn set_ignoring(&mut self, version_code: u32, value: bool) -> Result<(), PrefsError> {
        self.put(&Self::ignore_key(version_code), value)
    }

    /// Loads flags from a preference file.
    fn load_file(path: &PathBuf) -> Result<BTreeMap<String, bool>, PrefsError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let metadata = fs::metadata(path)?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(PrefsError::FileTooLarge);
        }

        let content = fs::read_to_string(path)?;
        let file: PrefsFile = toml::from_str(&content)?;
        Ok(file.flags)
    }

    /// Saves the store to disk.
    fn save(&self) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = PrefsFile {
            flags: self.flags.clone(),
        };
        let content = toml::to_string_pretty(&file)?;

        // Write atomically (write to temp, then rename)
        let temp_path = self.path.with_extension("tmp");

        {
            let mut out = fs::File::create(&temp_path)?;
            out.write_all(content.as_bytes())?;
            out.flush()?;
        }

        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

impl Default for PrefStore {
    fn default() -> Self {
        Self::new()
    }
}
