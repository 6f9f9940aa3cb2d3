//! `revtrack.toml` configuration.
//!
//! ```toml
//! [source]
//! folder = "reviews"
//! extensions = ["md", "txt", "docx", "gdoc"]
//!
//! [store]
//! path = ".revtrack/ledger.db"
//!
//! [sync]
//! interval_minutes = 15
//! log_file = "sync.log"
//! ```
//!
//! Every key is optional. Relative paths are resolved against the directory
//! holding the config file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RevtrackError};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "revtrack.toml";

/// Interval used when `[sync] interval_minutes` is absent.
pub const DEFAULT_INTERVAL_MINUTES: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source: SourceConfig,
    pub store: StoreConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Folder whose direct children are the review documents.
    pub folder: PathBuf,
    /// File extensions to track, without the dot. Empty tracks every file.
    pub extensions: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("reviews"),
            extensions: ["md", "txt", "docx", "gdoc"].map(String::from).to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".revtrack").join("ledger.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    pub interval_minutes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            log_file: None,
        }
    }
}

impl SyncConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }
}

impl Config {
    /// Parse config text. Paths are left as written.
    ///
    /// # Errors
    ///
    /// Returns [`RevtrackError::Config`] for invalid TOML, unknown keys, or
    /// a zero interval.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| RevtrackError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, falling back to defaults when the file does not exist,
    /// and resolve relative paths against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`RevtrackError::Io`] if the file exists but cannot be read,
    /// or [`RevtrackError::Config`] if it is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let text = std::fs::read_to_string(path)?;
            Self::from_toml(&text)
                .map_err(|e| RevtrackError::Config(format!("{}: {e}", path.display())))?
        } else {
            Self::default()
        };

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolved_against(base))
    }

    /// Serialize for `revtrack init`.
    ///
    /// # Errors
    ///
    /// Returns [`RevtrackError::Config`] if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RevtrackError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.sync.interval_minutes == 0 {
            return Err(RevtrackError::Config(
                "sync.interval_minutes must be at least 1".to_string(),
            ));
        }
        if self.sync.interval_minutes.checked_mul(60).is_none() {
            return Err(RevtrackError::Config(format!(
                "sync.interval_minutes {} is too large",
                self.sync.interval_minutes
            )));
        }
        Ok(())
    }

    fn resolved_against(mut self, base: &Path) -> Self {
        let resolve = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };
        self.source.folder = resolve(&self.source.folder);
        self.store.path = resolve(&self.store.path);
        self.sync.log_file = self.sync.log_file.as_deref().map(resolve);
        self
    }
}
