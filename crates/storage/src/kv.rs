//! Durable key-value store
//!
//! Session keys live in their own sled tree. Values written through
//! [`LocalStorage`] are kept as raw UTF-8 so a persisted token reads back
//! byte for byte.

use std::sync::Arc;

use crate::local::{check_key, LocalStorage, Result, StorageError};

const SESSION_TREE: &str = "session";

/// On-disk store settings
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct KvConfig {
    /// Directory of the sled database
    pub path: String,
    /// Page cache size in bytes
    pub cache_capacity: u64,
    /// Compress pages on disk
    pub use_compression: bool,
    /// Background flush interval; `None` relies on the explicit flush after
    /// every write
    pub flush_every_ms: Option<u64>,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            path: "gobarber_kv.db".to_string(),
            cache_capacity: 1024 * 1024,
            use_compression: true,
            flush_every_ms: None,
        }
    }
}

impl KvConfig {
    /// Settings for a database at `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Page cache size
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Toggle compression
    pub fn use_compression(mut self, enabled: bool) -> Self {
        self.use_compression = enabled;
        self
    }

    /// Background flush interval
    pub fn flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }

    fn sled_config(&self) -> sled::Config {
        sled::Config::new()
            .path(&self.path)
            .cache_capacity(self.cache_capacity)
            .use_compression(self.use_compression)
            .flush_every_ms(self.flush_every_ms)
    }
}

/// Sled-backed [`LocalStorage`]
///
/// Cloning is cheap and every clone sees the same data.
#[derive(Clone)]
pub struct KvStore {
    tree: Arc<sled::Tree>,
}

impl KvStore {
    /// Open (or create) the database described by `config`
    pub fn new(config: KvConfig) -> Result<Self> {
        let db = config.sled_config().open()?;
        let store = Self::on(&db)?;
        tracing::debug!(path = %config.path, entries = store.len(), "opened key-value store");
        Ok(store)
    }

    /// A throwaway store that is deleted when dropped
    pub fn in_memory() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::on(&db)
    }

    fn on(db: &sled::Db) -> Result<Self> {
        Ok(Self { tree: Arc::new(db.open_tree(SESSION_TREE)?) })
    }

    /// Whether `key` is present
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.tree.contains_key(key.as_bytes())?)
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl LocalStorage for KvStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let Some(bytes) = self.tree.get(key.as_bytes())? else {
            return Ok(None);
        };
        String::from_utf8(bytes.to_vec())
            .map(Some)
            .map_err(|_| StorageError::InvalidUtf8(key.to_string()))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        check_key(key)?;
        self.tree.insert(key.as_bytes(), value.as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<bool> {
        let existed = self.tree.remove(key.as_bytes())?.is_some();
        self.tree.flush()?;
        Ok(existed)
    }
}
