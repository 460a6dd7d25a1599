//! Player accounts and experience persistence.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from a player store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("player store I/O error at {path}: {source}")]
    Io {
        /// Backing file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The backing file is not valid JSON.
    #[error("player store at {path} is malformed: {source}")]
    Format {
        /// Backing file.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
    /// No account with this username.
    #[error("unknown player `{0}`")]
    UnknownPlayer(String),
}

/// Account lookup and experience bookkeeping.
pub trait PlayerStore: Send + Sync {
    /// Whether `username` exists and `password` matches.
    ///
    /// # Errors
    ///
    /// Backing storage failures.
    fn authenticate(&self, username: &str, password: &str) -> Result<bool, StoreError>;

    /// Stored experience for `username`.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownPlayer`] or a backing storage failure.
    fn experience(&self, username: &str) -> Result<u32, StoreError>;

    /// Add `amount` experience. Unknown users are left alone.
    ///
    /// # Errors
    ///
    /// Backing storage failures.
    fn add_experience(&self, username: &str, amount: u32) -> Result<(), StoreError>;
}

/// Stored experience, or 0 when the store cannot answer.
pub fn experience_or_default(store: &dyn PlayerStore, username: &str) -> u32 {
    store.experience(username).unwrap_or_else(|err| {
        warn!(%username, error = %err, "experience lookup failed, using 0");
        0
    })
}

/// Award experience; failures are logged and otherwise ignored.
pub fn award_or_log(store: &dyn PlayerStore, username: &str, amount: u32) {
    if let Err(err) = store.add_experience(username, amount) {
        warn!(%username, amount, error = %err, "failed to persist experience");
    }
}

/// One account as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Plain-text password.
    pub password: String,
    /// Accumulated experience.
    #[serde(default)]
    pub exp: u32,
    /// Any other keys on the account, written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

type Records = BTreeMap<String, PlayerRecord>;

fn lock(records: &Mutex<Records>) -> MutexGuard<'_, Records> {
    records.lock().unwrap_or_else(PoisonError::into_inner)
}

/// JSON-file-backed store: `{ "<user>": {"password": "..", "exp": 0} }`.
///
/// Reads the file on every lookup and rewrites it whole on update.
#[derive(Debug)]
pub struct JsonPlayerStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file.
    write_lock: Mutex<()>,
}

impl JsonPlayerStore {
    /// Use the file at `path`. It is not read until first use.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Records, StoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Format {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, records: &Records) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records).map_err(|source| StoreError::Format {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl PlayerStore for JsonPlayerStore {
    fn authenticate(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        let records = self.read()?;
        Ok(records.get(username).is_some_and(|r| r.password == password))
    }

    fn experience(&self, username: &str) -> Result<u32, StoreError> {
        self.read()?
            .get(username)
            .map(|r| r.exp)
            .ok_or_else(|| StoreError::UnknownPlayer(username.to_string()))
    }

    fn add_experience(&self, username: &str, amount: u32) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut records = self.read()?;
        let Some(record) = records.get_mut(username) else {
            debug!(%username, "experience update for unknown player ignored");
            return Ok(());
        };
        record.exp = record.exp.saturating_add(amount);
        self.write(&records)
    }
}

/// In-memory store for tests and offline matches.
#[derive(Debug, Default)]
pub struct MemoryPlayerStore {
    records: Mutex<Records>,
}

impl MemoryPlayerStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an account.
    pub fn insert(&self, username: impl Into<String>, password: impl Into<String>, exp: u32) {
        lock(&self.records).insert(
            username.into(),
            PlayerRecord {
                password: password.into(),
                exp,
                extra: Map::new(),
            },
        );
    }
}

impl PlayerStore for MemoryPlayerStore {
    fn authenticate(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        Ok(lock(&self.records)
            .get(username)
            .is_some_and(|r| r.password == password))
    }

    fn experience(&self, username: &str) -> Result<u32, StoreError> {
        lock(&self.records)
            .get(username)
            .map(|r| r.exp)
            .ok_or_else(|| StoreError::UnknownPlayer(username.to_string()))
    }

    fn add_experience(&self, username: &str, amount: u32) -> Result<(), StoreError> {
        if let Some(record) = lock(&self.records).get_mut(username) {
            record.exp = record.exp.saturating_add(amount);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_store(contents: &str) -> (tempfile::TempDir, JsonPlayerStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.json");
        fs::write(&path, contents).unwrap();
        (dir, JsonPlayerStore::new(path))
    }

    #[test]
    fn test_json_authenticate() {
        let (_dir, store) = json_store(r#"{"alice": {"password": "pw1", "exp": 40}}"#);
        assert!(store.authenticate("alice", "pw1").unwrap());
        assert!(!store.authenticate("alice", "nope").unwrap());
        assert!(!store.authenticate("mallory", "pw1").unwrap());
    }

    #[test]
    fn test_json_experience_roundtrips_through_file() {
        let (_dir, store) = json_store(r#"{"alice": {"password": "pw1"}}"#);
        assert_eq!(store.experience("alice").unwrap(), 0);
        store.add_experience("alice", 30).unwrap();
        store.add_experience("alice", 10).unwrap();
        assert_eq!(store.experience("alice").unwrap(), 40);

        let reopened = JsonPlayerStore::new(store.path());
        assert_eq!(reopened.experience("alice").unwrap(), 40);
    }

    #[test]
    fn test_json_update_keeps_other_account_keys() {
        let (_dir, store) = json_store(
            r#"{"alice": {"password": "pw1", "exp": 5, "wins": 3, "title": "champ"}}"#,
        );
        store.add_experience("alice", 30).unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["alice"]["exp"], 35);
        assert_eq!(raw["alice"]["wins"], 3);
        assert_eq!(raw["alice"]["title"], "champ");
        assert_eq!(raw["alice"]["password"], "pw1");
    }

    #[test]
    fn test_json_unknown_player() {
        let (_dir, store) = json_store(r#"{"alice": {"password": "pw1", "exp": 1}}"#);
        assert!(matches!(
            store.experience("bob"),
            Err(StoreError::UnknownPlayer(name)) if name == "bob"
        ));
        store.add_experience("bob", 30).unwrap();
        assert_eq!(store.experience("alice").unwrap(), 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPlayerStore::new(dir.path().join("absent.json"));
        assert!(matches!(
            store.authenticate("alice", "pw"),
            Err(StoreError::Io { .. })
        ));
        assert_eq!(experience_or_default(&store, "alice"), 0);
        award_or_log(&store, "alice", 30);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryPlayerStore::new();
        store.insert("alice", "pw", 5);
        assert!(store.authenticate("alice", "pw").unwrap());
        store.add_experience("alice", 30).unwrap();
        assert_eq!(store.experience("alice").unwrap(), 35);
        assert_eq!(experience_or_default(&store, "ghost"), 0);
    }
}
