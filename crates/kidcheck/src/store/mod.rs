//! Device-local key-value store.
//!
//! All kiosk state lives under a handful of string keys, each holding a JSON
//! document. The [`KeyValueStore`] trait is the only way the rest of the
//! crate touches persistence, so the SQLite-backed store used by the binary
//! and the in-memory store used by tests are interchangeable.
//!
//! Loads distinguish a missing entry from one that no longer parses (see
//! [`Loaded`]); the collection views fall back to an empty value in both
//! cases but log the corrupt case.

mod memory;
pub mod migrations;
mod observed;
pub mod schema;
mod sqlite;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{trace, warn};

use crate::error::Result;

pub use memory::MemoryStore;
pub use observed::{ChangeKind, ObservedStore, StoreChange};
pub use sqlite::{EntryInfo, SqliteStore};

/// Keys of the persisted entries.
pub mod keys {
    /// Child profiles, JSON array.
    pub const CHILDREN: &str = "cck_children_v1";
    /// Attendance events, JSON array, newest first.
    pub const EVENTS: &str = "cck_events_v1";
    /// Instructor roster, JSON array.
    pub const INSTRUCTORS: &str = "cck_instructors_v1";
    /// Announcement shown on the sign-in/out screens, JSON object.
    pub const ANNOUNCEMENT: &str = "cck_instructor_updates_v1";
    /// Team PIN, plain string.
    pub const TEAM_PIN: &str = "cck_team_pin_v1";
    /// Team unlocked flag, `"true"` or absent.
    pub const TEAM_UNLOCKED: &str = "cck_team_unlocked_v1";

    /// Every key the kiosk writes.
    pub const ALL: &[&str] = &[
        CHILDREN,
        EVENTS,
        INSTRUCTORS,
        ANNOUNCEMENT,
        TEAM_PIN,
        TEAM_UNLOCKED,
    ];
}

/// A string key-value store scoped to this device.
///
/// Writes replace the whole value; there is no locking, so concurrent
/// writers to the same key lose updates (last writer wins).
pub trait KeyValueStore {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Returns `true` if it was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<bool>;
}

/// Outcome of loading a JSON entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded<T> {
    /// Nothing stored under the key (or an empty string).
    Absent,
    /// The entry parsed.
    Present(T),
    /// The entry exists but does not parse as the expected type.
    Corrupt {
        /// Parser message.
        reason: String,
    },
}

impl<T> Loaded<T> {
    /// Whether the stored entry failed to parse.
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }

    /// The parsed value, if any.
    #[must_use]
    pub fn present(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Corrupt { .. } => None,
        }
    }
}

impl<T: Default> Loaded<T> {
    /// The parsed value, or `T::default()` when absent or corrupt.
    #[must_use]
    pub fn unwrap_or_default(self) -> T {
        self.present().unwrap_or_default()
    }
}

/// Load and parse the JSON entry under `key`.
///
/// # Errors
///
/// Returns an error only if the store itself fails; unparseable data is
/// reported as [`Loaded::Corrupt`].
pub fn load_json<S, T>(store: &S, key: &str) -> Result<Loaded<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let Some(raw) = store.get(key)? else {
        return Ok(Loaded::Absent);
    };
    if raw.is_empty() {
        return Ok(Loaded::Absent);
    }

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Loaded::Present(value)),
        Err(e) => Ok(Loaded::Corrupt {
            reason: e.to_string(),
        }),
    }
}

/// Load the JSON entry under `key`, falling back to the default value when
/// it is missing or corrupt.
///
/// # Errors
///
/// Returns an error only if the store itself fails.
pub fn load_or_default<S, T>(store: &S, key: &str) -> Result<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned + Default,
{
    let loaded = load_json(store, key)?;
    if let Loaded::Corrupt { reason } = &loaded {
        warn!(key, %reason, "Stored entry is corrupt, treating it as empty");
    }
    Ok(loaded.unwrap_or_default())
}

/// Serialize `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns an error if serialization or the store write fails.
pub fn save_json<S, T>(store: &S, key: &str, value: &T) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    trace!(key, bytes = raw.len(), "Saving entry");
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_json_absent() {
        let store = MemoryStore::new();
        let loaded: Loaded<Vec<String>> = load_json(&store, "missing").unwrap();
        assert_eq!(loaded, Loaded::Absent);
    }

    #[test]
    fn test_load_json_empty_string_is_absent() {
        let store = MemoryStore::new();
        store.set("k", "").unwrap();
        let loaded: Loaded<Vec<String>> = load_json(&store, "k").unwrap();
        assert_eq!(loaded, Loaded::Absent);
    }

    #[test]
    fn test_load_json_present() {
        let store = MemoryStore::new();
        save_json(&store, "k", &vec!["a".to_string(), "b".to_string()]).unwrap();

        let loaded: Loaded<Vec<String>> = load_json(&store, "k").unwrap();
        assert_eq!(loaded, Loaded::Present(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_load_json_corrupt() {
        let store = MemoryStore::new();
        store.set("k", "{not json").unwrap();

        let loaded: Loaded<Vec<String>> = load_json(&store, "k").unwrap();
        assert!(loaded.is_corrupt());
        assert_eq!(loaded.unwrap_or_default(), Vec::<String>::new());
    }

    #[test]
    fn test_load_json_wrong_shape_is_corrupt() {
        let store = MemoryStore::new();
        store.set("k", r#"{"an": "object"}"#).unwrap();

        let loaded: Loaded<Vec<String>> = load_json(&store, "k").unwrap();
        assert!(loaded.is_corrupt());
    }

    #[test]
    fn test_load_or_default_masks_corruption() {
        crate::logging::init_test_logging();
        let store = MemoryStore::new();
        store.set("k", "garbage").unwrap();

        let value: Vec<u32> = load_or_default(&store, "k").unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn test_keys_are_distinct() {
        let mut all = keys::ALL.to_vec();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), keys::ALL.len());
    }
}
