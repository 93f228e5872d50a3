//! Application configuration loaded from `config.toml`.
//!
//! ```toml
//! prefs_dir = "/srv/lookbook/prefs"
//!
//! [links]
//! backend = "serpapi"
//! cache_ttl_seconds = 600
//! indian_share = 0.7
//! ```
//!
//! Every field is optional. Environment overrides (see
//! [`LinksConfig::apply_env_overrides_from`]) apply after the file.

use std::path::{Path, PathBuf};

use lookbook_search::LinksConfig;
use serde::{Deserialize, Serialize};

use crate::error::{LookbookError, Result};
use crate::lookbook_dirs;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookbookConfig {
    /// Link pipeline settings.
    pub links: LinksConfig,
    /// Where preference records live. Defaults to
    /// [`lookbook_dirs::prefs_dir`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefs_dir: Option<PathBuf>,
}

impl LookbookConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| LookbookError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| LookbookError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default config file if it exists, then apply
    /// environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file is unreadable or malformed, or
    /// if the final link settings are invalid.
    pub fn load() -> Result<Self> {
        Self::load_with(&lookbook_dirs::config_file(), |key| std::env::var(key).ok())
    }

    /// [`LookbookConfig::load`] with an explicit path and variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`LookbookConfig::load`].
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() {
            tracing::debug!(path = %path.display(), "loading config file");
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.links.apply_env_overrides_from(lookup);
        config.links.validate()?;
        Ok(config)
    }

    /// Resolved preference directory.
    #[must_use]
    pub fn prefs_dir(&self) -> PathBuf {
        self.prefs_dir
            .clone()
            .unwrap_or_else(lookbook_dirs::prefs_dir)
    }
}
