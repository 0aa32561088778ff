//! Key-value storage abstraction for reading progress.
//!
//! The [`KvStore`] trait is the device's local storage: string keys to
//! string values, no transactions. The native crate backs it with SQLite;
//! [`memory::InMemoryKv`] backs it with a map for tests and throwaway
//! sessions.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

/// Abstract local storage backend.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`get`](KvStore::get) | Read a value, `None` when absent |
/// | [`set`](KvStore::set) | Insert or overwrite a value |
/// | [`remove`](KvStore::remove) | Delete a key (absent is not an error) |
/// | [`keys`](KvStore::keys) | List every key, sorted |
/// | [`clear`](KvStore::clear) | Delete everything |
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;

    async fn keys(&self) -> Result<Vec<String>>;

    async fn clear(&self) -> Result<()>;
}
