//! Per-user link preferences stored as one JSON file per username.
//!
//! Loading never fails: anything unexpected (no username, an unsafe
//! username, a corrupt record, an unwritable directory) falls back to
//! default preferences.

use std::path::{Path, PathBuf};

use lookbook_search::UserPrefs;

use crate::error::{LookbookError, Result};

/// File-backed preference store rooted at a directory.
#[derive(Debug, Clone)]
pub struct PrefsStore {
    dir: PathBuf,
}

impl PrefsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load preferences for `username`.
    ///
    /// An empty or unsafe username yields transient defaults without
    /// touching storage. A missing record is created with defaults; a
    /// corrupt one yields defaults and is left as is.
    pub fn load(&self, username: &str) -> UserPrefs {
        let Some(path) = self.record_path(username) else {
            return UserPrefs::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(prefs) => prefs,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "corrupt prefs record; using defaults");
                    UserPrefs::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let prefs = UserPrefs::default();
                if let Err(e) = self.write_record(&path, &prefs) {
                    tracing::warn!(path = %path.display(), error = %e, "could not create prefs record");
                }
                prefs
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable prefs record; using defaults");
                UserPrefs::default()
            }
        }
    }

    /// Persist preferences for `username`.
    ///
    /// # Errors
    ///
    /// Returns [`LookbookError::Prefs`] for an empty or unsafe username, or
    /// an I/O error if the record cannot be written.
    pub fn save(&self, username: &str, prefs: &UserPrefs) -> Result<()> {
        let path = self
            .record_path(username)
            .ok_or_else(|| LookbookError::Prefs(format!("invalid username: {username:?}")))?;
        self.write_record(&path, prefs)
    }

    fn record_path(&self, username: &str) -> Option<PathBuf> {
        if !is_safe_username(username) {
            if !username.is_empty() {
                tracing::warn!("refusing unsafe username for prefs lookup");
            }
            return None;
        }
        Some(self.dir.join(format!("{username}.json")))
    }

    fn write_record(&self, path: &Path, prefs: &UserPrefs) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(prefs)
            .map_err(|e| LookbookError::Prefs(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Usernames map directly to file names, so only a conservative alphabet
/// is accepted.
fn is_safe_username(username: &str) -> bool {
    !username.is_empty()
        && !username.contains("..")
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '@' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookbook_search::PreferTier;

    #[test]
    fn empty_username_is_transient() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PrefsStore::new(dir.path().join("prefs"));
        assert_eq!(store.load(""), UserPrefs::default());
        assert!(!store.dir().exists());
    }

    #[test]
    fn missing_record_is_created_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PrefsStore::new(dir.path());

        let prefs = store.load("asha");
        assert_eq!(prefs, UserPrefs::default());

        let written = std::fs::read_to_string(dir.path().join("asha.json")).expect("record");
        let value: serde_json::Value = serde_json::from_str(&written).expect("json");
        assert_eq!(value["prefer_tier"], "balanced");
        assert_eq!(value["avoid_domains"], serde_json::json!([]));
    }

    #[test]
    fn existing_record_is_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("ravi.json"),
            r#"{"prefer_tier": "niche", "avoid_domains": ["myntra.com"]}"#,
        )
        .expect("write");

        let prefs = PrefsStore::new(dir.path()).load("ravi");
        assert_eq!(prefs.prefer_tier, PreferTier::Niche);
        assert!(prefs.avoid_domains.contains("myntra.com"));
    }

    #[test]
    fn corrupt_record_yields_defaults_and_is_kept() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("meera.json");
        std::fs::write(&path, "{not json").expect("write");

        let prefs = PrefsStore::new(dir.path()).load("meera");
        assert_eq!(prefs, UserPrefs::default());
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "{not json");
    }

    #[test]
    fn unsafe_usernames_are_refused() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PrefsStore::new(dir.path().join("prefs"));
        for name in ["../etc/passwd", "a/b", "a\\b", "..", "name with space", "ümlaut"] {
            assert_eq!(store.load(name), UserPrefs::default(), "{name}");
            assert!(store.save(name, &UserPrefs::default()).is_err(), "{name}");
        }
        assert!(!store.dir().exists());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PrefsStore::new(dir.path().join("nested"));
        let prefs = UserPrefs {
            prefer_tier: PreferTier::Mainstream,
            avoid_domains: ["ajio.com".to_owned()].into(),
        };
        store.save("user.one@example.com", &prefs).expect("save");
        assert_eq!(store.load("user.one@example.com"), prefs);
    }

    #[test]
    fn safe_username_alphabet() {
        assert!(is_safe_username("A-z_0.9@x"));
        assert!(!is_safe_username(""));
        assert!(!is_safe_username("a..b"));
    }
}
