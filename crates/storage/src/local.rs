//! Local-storage abstraction
//!
//! The session store only ever needs three primitives: read a string, write a
//! string, delete a key. Anything that can do that (sled on disk, a map in
//! memory) implements [`LocalStorage`].

use thiserror::Error;

/// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    /// Sled database error
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored bytes are not valid UTF-8
    #[error("Invalid UTF-8 in value for key: {0}")]
    InvalidUtf8(String),

    /// Invalid key
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// String key/value storage that survives application restarts
pub trait LocalStorage: Send + Sync {
    /// Read the value stored under `key`
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Returns whether a value was present.
    fn remove_item(&self, key: &str) -> Result<bool>;
}

/// Application key prefix, e.g. `@GoBarber` producing `@GoBarber:token`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
    separator: &'static str,
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new("@GoBarber")
    }
}

impl Namespace {
    /// Create a namespace with the given prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), separator: ":" }
    }

    /// The bare prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Build a fully qualified key
    pub fn key(&self, name: &str) -> String {
        format!("{}{}{}", self.prefix, self.separator, name)
    }
}

pub(crate) fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}
