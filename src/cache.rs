//! On-device content cache.
//!
//! One JSON file per cache key under a dedicated directory:
//! `<dir>/<key>.json`. Entries are never revalidated or expired; they stay
//! until the directory is cleared. Keys come from [`CacheKey`], which only
//! ever formats validated numbers, so the key-to-path mapping is a plain
//! join.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use gita_core::error::{AccessError, AccessResult};
use gita_core::keys::CacheKey;
use log::debug;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Create the cache directory if it is missing. Safe to call repeatedly.
    pub async fn ensure_dir(&self) -> AccessResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AccessError::storage(self.dir.display().to_string(), e))
    }

    /// Read a cached value. `Ok(None)` when nothing is cached for `key`;
    /// an unreadable or unparsable file is a `StorageFailure`.
    pub async fn read(&self, key: &CacheKey) -> AccessResult<Option<Value>> {
        self.ensure_dir().await?;
        let path = self.path_for(key);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AccessError::storage(key.to_string(), e)),
        };
        let value =
            serde_json::from_str(&raw).map_err(|e| AccessError::storage(key.to_string(), e))?;
        debug!("cache hit: {}", path.display());
        Ok(Some(value))
    }

    /// Serialize `value` and overwrite the file for `key`.
    pub async fn write(&self, key: &CacheKey, value: &Value) -> AccessResult<()> {
        self.ensure_dir().await?;
        let raw =
            serde_json::to_string(value).map_err(|e| AccessError::storage(key.to_string(), e))?;
        tokio::fs::write(self.path_for(key), raw)
            .await
            .map_err(|e| AccessError::storage(key.to_string(), e))?;
        debug!("cache write: {}", key);
        Ok(())
    }

    /// Delete every cached `.json` file. Returns how many were removed.
    pub async fn clear(&self) -> AccessResult<usize> {
        let dir_key = self.dir.display().to_string();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(AccessError::storage(dir_key, e)),
        };
        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AccessError::storage(dir_key.clone(), e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                tokio::fs::remove_file(&path)
                    .await
                    .map_err(|e| AccessError::storage(path.display().to_string(), e))?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Number of cached entries currently on disk.
    pub async fn entry_count(&self) -> AccessResult<usize> {
        let dir_key = self.dir.display().to_string();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(AccessError::storage(dir_key, e)),
        };
        let mut count = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AccessError::storage(dir_key.clone(), e))?
        {
            if entry.path().extension().and_then(|e| e.to_str()) == Some("json") {
                count += 1;
            }
        }
        Ok(count)
    }
}
