//! Change notifications for store writes.
//!
//! [`ObservedStore`] wraps another store and publishes a [`StoreChange`] for
//! every successful write. Views that need to stay fresh subscribe instead
//! of polling.

use tokio::sync::broadcast;
use tracing::trace;

use crate::error::Result;

use super::KeyValueStore;

/// Buffered notifications per subscriber before the oldest are dropped.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// What happened to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The entry was written.
    Set,
    /// The entry was removed.
    Removed,
}

/// A write to one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    /// The key that changed.
    pub key: String,
    /// Kind of change.
    pub kind: ChangeKind,
}

/// A store that announces its writes.
#[derive(Debug)]
pub struct ObservedStore<S> {
    inner: S,
    sender: broadcast::Sender<StoreChange>,
}

impl<S: KeyValueStore> ObservedStore<S> {
    /// Wrap `inner`.
    #[must_use]
    pub fn new(inner: S) -> Self {
        let (sender, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { inner, sender }
    }

    /// Receive every change made through this store from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.sender.subscribe()
    }

    /// The wrapped store.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn publish(&self, key: &str, kind: ChangeKind) {
        // No subscribers is not an error.
        let receivers = self
            .sender
            .send(StoreChange {
                key: key.to_string(),
                kind,
            })
            .unwrap_or(0);
        trace!(key, ?kind, receivers, "Published store change");
    }
}

impl<S: KeyValueStore> KeyValueStore for ObservedStore<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value)?;
        self.publish(key, ChangeKind::Set);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let removed = self.inner.remove(key)?;
        if removed {
            self.publish(key, ChangeKind::Removed);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_set_publishes_change() {
        let store = ObservedStore::new(MemoryStore::new());
        let mut rx = store.subscribe();

        store.set("k", "v").unwrap();

        let change = rx.try_recv().unwrap();
        assert_eq!(change.key, "k");
        assert_eq!(change.kind, ChangeKind::Set);
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_remove_publishes_only_when_present() {
        let store = ObservedStore::new(MemoryStore::new());
        store.set("k", "v").unwrap();
        let mut rx = store.subscribe();

        assert!(!store.remove("other").unwrap());
        assert!(store.remove("k").unwrap());

        let change = rx.try_recv().unwrap();
        assert_eq!(change.key, "k");
        assert_eq!(change.kind, ChangeKind::Removed);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_write_without_subscribers() {
        let store = ObservedStore::new(MemoryStore::new());
        store.set("k", "v").unwrap();
        assert_eq!(store.inner().len(), 1);
    }

    #[test]
    fn test_reads_do_not_publish() {
        let store = ObservedStore::new(MemoryStore::new());
        let mut rx = store.subscribe();

        let _ = store.get("k").unwrap();
        assert!(rx.try_recv().is_err());
    }
}
