//! Lookbook: shoppable retailer links for outfit recommendations.
//!
//! The link pipeline itself lives in the `lookbook-search` crate. This crate
//! wraps it for a host application:
//! - **Configuration**: `config.toml` plus environment overrides
//! - **Preferences**: one JSON record per user
//! - **Host bridge**: newline-delimited JSON commands over stdin/stdout

pub mod config;
pub mod error;
pub mod host;
pub mod lookbook_dirs;
pub mod prefs;

pub use config::LookbookConfig;
pub use error::{LookbookError, Result};
pub use prefs::PrefsStore;

pub use lookbook_search;
