//! Application directory paths for lookbook.
//!
//! Uses the [`dirs`] crate for platform-appropriate locations.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | App data | `~/Library/Application Support/lookbook/` | `~/.local/share/lookbook/` |
//! | Config | `~/Library/Application Support/lookbook/` | `~/.config/lookbook/` |
//!
//! Overrides for tests and custom deployments:
//! - `LOOKBOOK_DATA_DIR` overrides [`data_dir`]
//! - `LOOKBOOK_CONFIG_DIR` overrides [`config_dir`]

use std::ffi::OsString;
use std::path::PathBuf;

const APP_DIR: &str = "lookbook";

fn resolve(override_dir: Option<OsString>, base: Option<PathBuf>, fallback: &str) -> PathBuf {
    if let Some(dir) = override_dir {
        return PathBuf::from(dir);
    }
    base.map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(fallback))
}

/// Application data root, home of the per-user preference records.
///
/// Resolves to `dirs::data_dir()/lookbook/` unless `LOOKBOOK_DATA_DIR` is set.
#[must_use]
pub fn data_dir() -> PathBuf {
    resolve(
        std::env::var_os("LOOKBOOK_DATA_DIR"),
        dirs::data_dir(),
        "/tmp/lookbook-data",
    )
}

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/lookbook/` unless `LOOKBOOK_CONFIG_DIR`
/// is set.
#[must_use]
pub fn config_dir() -> PathBuf {
    resolve(
        std::env::var_os("LOOKBOOK_CONFIG_DIR"),
        dirs::config_dir(),
        "/tmp/lookbook-config",
    )
}

/// Per-user preference records (`data_dir()/prefs/`).
#[must_use]
pub fn prefs_dir() -> PathBuf {
    data_dir().join("prefs")
}

/// Main config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}
