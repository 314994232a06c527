//! Storage layer for the GoBarber client
//!
//! This crate provides the durable key/value storage that backs the
//! persisted session, modelled on browser local storage: string keys,
//! string values, namespaced under an application prefix.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod local;
pub mod memory;

pub use kv::{KvConfig, KvStore};
pub use local::{LocalStorage, Namespace, StorageError};
pub use memory::{MemoryStorage, StorageOp};
