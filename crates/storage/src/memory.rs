//! In-memory local storage
//!
//! A [`LocalStorage`] backed by a hash map. Every call is appended to a
//! journal so callers can inspect exactly which reads, writes and deletions
//! happened and in what order.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::local::{check_key, LocalStorage, Result};

/// A single recorded storage call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageOp {
    /// `get_item(key)`
    Get(String),
    /// `set_item(key, value)`
    Set(String, String),
    /// `remove_item(key)`
    Remove(String),
}

#[derive(Debug, Default)]
struct Inner {
    items: HashMap<String, String>,
    journal: Vec<StorageOp>,
}

/// Hash-map storage with an operation journal
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-populated with items. Seeding is not journaled.
    pub fn with_items<K, V>(items: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let storage = Self::new();
        {
            let mut inner = storage.inner.lock();
            for (key, value) in items {
                inner.items.insert(key.into(), value.into());
            }
        }
        storage
    }

    /// Snapshot of the value under `key`, bypassing the journal
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.lock().items.get(key).cloned()
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Check if no items are stored
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// All recorded operations, oldest first
    pub fn journal(&self) -> Vec<StorageOp> {
        self.inner.lock().journal.clone()
    }

    /// Recorded writes and deletions, without reads
    pub fn mutations(&self) -> Vec<StorageOp> {
        self.inner
            .lock()
            .journal
            .iter()
            .filter(|op| !matches!(op, StorageOp::Get(_)))
            .cloned()
            .collect()
    }

    /// Forget recorded operations
    pub fn clear_journal(&self) {
        self.inner.lock().journal.clear();
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let mut inner = self.inner.lock();
        inner.journal.push(StorageOp::Get(key.to_string()));
        Ok(inner.items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        check_key(key)?;
        let mut inner = self.inner.lock();
        inner
            .journal
            .push(StorageOp::Set(key.to_string(), value.to_string()));
        inner.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<bool> {
        let mut inner = self.inner.lock();
        inner.journal.push(StorageOp::Remove(key.to_string()));
        Ok(inner.items.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());

        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
        assert_eq!(storage.len(), 1);

        assert!(storage.remove_item("k").unwrap());
        assert!(!storage.remove_item("k").unwrap());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_journal_records_order() {
        let storage = MemoryStorage::new();

        storage.set_item("a", "1").unwrap();
        storage.get_item("a").unwrap();
        storage.remove_item("a").unwrap();

        assert_eq!(
            storage.journal(),
            vec![
                StorageOp::Set("a".into(), "1".into()),
                StorageOp::Get("a".into()),
                StorageOp::Remove("a".into()),
            ]
        );
        assert_eq!(storage.mutations().len(), 2);

        storage.clear_journal();
        assert!(storage.journal().is_empty());
    }

    #[test]
    fn test_seeded_items_are_not_journaled() {
        let storage = MemoryStorage::with_items([("@GoBarber:token", "t")]);
        assert_eq!(storage.peek("@GoBarber:token").as_deref(), Some("t"));
        assert!(storage.journal().is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let storage = MemoryStorage::new();
        let other = storage.clone();

        storage.set_item("shared", "yes").unwrap();
        assert_eq!(other.peek("shared").as_deref(), Some("yes"));
    }
}
