//! Configuration for bibrec
//!
//! Settings are read from a TOML file. Every section and key is optional;
//! missing values fall back to the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BibError, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sort: SortConfig,
    pub parse: ParseConfig,
}

/// Date-sort settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Put the most recent entries first
    pub newest_first: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self { newest_first: true }
    }
}

/// BibTeX-like parser settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Log unrecognized lines at warn level instead of debug
    pub warn_unrecognized: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            warn_unrecognized: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| BibError::Config(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| BibError::Config(e.to_string()))
    }

    /// Default location: `<config dir>/bibrec/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("bibrec").join("config.toml"))
    }

    /// Load from an explicit path, or from the default location when it
    /// exists, or fall back to defaults.
    ///
    /// An explicit path that cannot be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.is_file() => p,
                _ => {
                    debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!(path = %path.display(), "Loading config");
        let text = std::fs::read_to_string(&path).map_err(|source| BibError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&text)
    }
}
