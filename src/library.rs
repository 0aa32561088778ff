//! Verse/chapter access layer.
//!
//! [`Library`] is the single answer to "what does chapter X / verse (X, Y)
//! contain". It hides which [`VerseSource`] is behind it:
//!
//! | Source | Behavior |
//! |--------|----------|
//! | [`Bundle`] | in-memory lookups over the bundled dataset, no I/O |
//! | [`CachedRemote`] | on-device cache first, remote API on a miss |
//!
//! # Remote policy
//!
//! For every call the cache key is derived ([`CacheKey`]) and the cache is
//! consulted first. A hit returns without touching the network; entries are
//! never revalidated. On a miss the remote payload is fetched, validated
//! against the typed record, written to the cache under the same key, and
//! only then returned. Nothing is retried here: a failed fetch surfaces as
//! [`AccessError::FetchFailed`] (or [`AccessError::DataUnavailable`] for the
//! chapter list) and the caller decides whether to try again.
//!
//! Storage problems never fail a read. A corrupt cache file counts as a
//! miss and gets overwritten; a failed cache write is logged and the fetched
//! value is still returned.
//!
//! Not-found is `Ok(None)`: ids outside `1..=18`, non-numeric ids, verses
//! past the end of a chapter, and remote 404s.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use gita_core::daily::verse_of_the_day;
use gita_core::error::{AccessError, AccessResult};
use gita_core::keys::{CacheKey, IntoId};
use gita_core::models::{Chapter, Verse, CHAPTER_COUNT};

use crate::bundle::Bundle;
use crate::cache::FileCache;
use crate::config::{Config, SourceMode};
use crate::remote::{HttpSource, RemoteSource};

/// Backend contract for the access layer. Ids are already coerced.
#[async_trait]
pub trait VerseSource: Send + Sync {
    async fn chapters(&self) -> AccessResult<Vec<Chapter>>;

    async fn chapter(&self, number: u32) -> AccessResult<Option<Chapter>>;

    async fn slok(&self, chapter: u32, verse: u32) -> AccessResult<Option<Verse>>;

    /// One-line description for `gita sources` and logs.
    fn describe(&self) -> String;
}

#[async_trait]
impl VerseSource for Bundle {
    async fn chapters(&self) -> AccessResult<Vec<Chapter>> {
        Ok(Bundle::chapters(self).to_vec())
    }

    async fn chapter(&self, number: u32) -> AccessResult<Option<Chapter>> {
        Ok(Bundle::chapter(self, number).cloned())
    }

    async fn slok(&self, chapter: u32, verse: u32) -> AccessResult<Option<Verse>> {
        Ok(Bundle::slok(self, chapter, verse).cloned())
    }

    fn describe(&self) -> String {
        format!("bundled ({} verses)", self.verse_count())
    }
}

// ============ Remote + cache ============

/// A record type the remote variant can fetch and cache.
trait CachedRecord: DeserializeOwned + Send {
    /// Check the decoded payload actually answers `key`.
    fn check(&self, key: &CacheKey) -> AccessResult<()>;
}

impl CachedRecord for Chapter {
    fn check(&self, key: &CacheKey) -> AccessResult<()> {
        self.validate()?;
        if *key != CacheKey::Chapter(self.chapter_number) {
            return Err(AccessError::invalid(
                key.to_string(),
                format!("payload is chapter {}", self.chapter_number),
            ));
        }
        Ok(())
    }
}

impl CachedRecord for Verse {
    fn check(&self, key: &CacheKey) -> AccessResult<()> {
        self.validate()?;
        if *key != CacheKey::Slok(self.chapter, self.verse) {
            return Err(AccessError::invalid(
                key.to_string(),
                format!("payload is verse {}", self.key()),
            ));
        }
        Ok(())
    }
}

impl CachedRecord for Vec<Chapter> {
    fn check(&self, key: &CacheKey) -> AccessResult<()> {
        for chapter in self {
            chapter.validate()?;
        }
        let mut numbers: Vec<u32> = self.iter().map(|c| c.chapter_number).collect();
        numbers.sort_unstable();
        if !numbers.iter().copied().eq(1..=CHAPTER_COUNT) {
            return Err(AccessError::invalid(
                key.to_string(),
                format!("expected chapters 1..={}, found {:?}", CHAPTER_COUNT, numbers),
            ));
        }
        Ok(())
    }
}

/// Network-backed source with an on-device cache in front.
pub struct CachedRemote {
    remote: Arc<dyn RemoteSource>,
    cache: FileCache,
}

impl CachedRemote {
    pub fn new(remote: Arc<dyn RemoteSource>, cache: FileCache) -> Self {
        Self { remote, cache }
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    async fn cached<T: CachedRecord>(&self, key: &CacheKey) -> Option<T> {
        match self.cache.read(key).await {
            Ok(Some(raw)) => match serde_json::from_value::<T>(raw) {
                Ok(record) if record.check(key).is_ok() => Some(record),
                _ => {
                    warn!("discarding unusable cache entry {}", key);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("cache read failed, treating as miss: {}", e);
                None
            }
        }
    }

    /// Cache-or-fetch for one key.
    async fn load<T: CachedRecord>(&self, key: CacheKey) -> AccessResult<Option<T>> {
        if let Some(record) = self.cached(&key).await {
            return Ok(Some(record));
        }

        debug!("cache miss: {}, fetching {}", key, key.remote_path());
        let raw = self
            .remote
            .fetch(&key.remote_path())
            .await
            .map_err(|e| AccessError::fetch(key.to_string(), e))?;
        let raw = match raw {
            Some(raw) if !raw.is_null() => raw,
            _ => {
                debug!("remote has no {}", key);
                return Ok(None);
            }
        };

        let record: T = serde_json::from_value(raw.clone())
            .map_err(|e| AccessError::invalid(key.to_string(), e.to_string()))?;
        record.check(&key)?;

        if let Err(e) = self.cache.write(&key, &raw).await {
            warn!("cache write failed, serving uncached: {}", e);
        }
        Ok(Some(record))
    }
}

#[async_trait]
impl VerseSource for CachedRemote {
    async fn chapters(&self) -> AccessResult<Vec<Chapter>> {
        let mut chapters: Vec<Chapter> = match self.load(CacheKey::Chapters).await {
            Ok(Some(list)) => list,
            Ok(None) => {
                return Err(AccessError::DataUnavailable(format!(
                    "{} has no chapter list",
                    self.remote.origin()
                )))
            }
            Err(AccessError::FetchFailed { source, .. }) => {
                return Err(AccessError::DataUnavailable(format!("{:#}", source)))
            }
            Err(e) => return Err(e),
        };
        chapters.sort_by_key(|c| c.chapter_number);
        Ok(chapters)
    }

    async fn chapter(&self, number: u32) -> AccessResult<Option<Chapter>> {
        self.load(CacheKey::Chapter(number)).await
    }

    async fn slok(&self, chapter: u32, verse: u32) -> AccessResult<Option<Verse>> {
        self.load(CacheKey::Slok(chapter, verse)).await
    }

    fn describe(&self) -> String {
        format!(
            "remote {} (cache {})",
            self.remote.origin(),
            self.cache.dir().display()
        )
    }
}

// ============ Facade ============

/// The access layer handed to callers. Cheap to clone.
#[derive(Clone)]
pub struct Library {
    source: Arc<dyn VerseSource>,
}

impl Library {
    pub fn new(source: Arc<dyn VerseSource>) -> Self {
        Self { source }
    }

    pub fn bundled(bundle: Bundle) -> Self {
        Self::new(Arc::new(bundle))
    }

    pub fn remote(remote: Arc<dyn RemoteSource>, cache: FileCache) -> Self {
        Self::new(Arc::new(CachedRemote::new(remote, cache)))
    }

    /// Build the variant selected by `source.mode`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let library = match config.source.mode {
            SourceMode::Bundled => {
                let bundle_cfg = config
                    .bundle
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("[bundle] section required"))?;
                Self::bundled(Bundle::load(&bundle_cfg.path).await?)
            }
            SourceMode::Remote => {
                let cache_cfg = config
                    .cache
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("[cache] section required"))?;
                let remote = HttpSource::new(&config.remote_or_default())?;
                Self::remote(Arc::new(remote), FileCache::new(&cache_cfg.dir))
            }
        };
        info!("content source: {}", library.describe());
        Ok(library)
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    /// All chapters, ascending by number.
    pub async fn get_chapters(&self) -> AccessResult<Vec<Chapter>> {
        self.source.chapters().await
    }

    pub async fn get_chapter(&self, id: impl IntoId) -> AccessResult<Option<Chapter>> {
        match id.into_id() {
            Some(n) if n <= CHAPTER_COUNT => self.source.chapter(n).await,
            _ => Ok(None),
        }
    }

    pub async fn get_slok(
        &self,
        chapter: impl IntoId,
        verse: impl IntoId,
    ) -> AccessResult<Option<Verse>> {
        match (chapter.into_id(), verse.into_id()) {
            (Some(c), Some(v)) if c <= CHAPTER_COUNT => self.source.slok(c, v).await,
            _ => Ok(None),
        }
    }

    /// Every verse of a chapter in order. Empty when the chapter does not
    /// exist.
    pub async fn verses_of(&self, chapter: impl IntoId) -> AccessResult<Vec<Verse>> {
        let Some(meta) = self.get_chapter(chapter).await? else {
            return Ok(Vec::new());
        };
        let mut verses = Vec::with_capacity(meta.verses_count as usize);
        for v in 1..=meta.verses_count {
            if let Some(verse) = self.source.slok(meta.chapter_number, v).await? {
                verses.push(verse);
            }
        }
        Ok(verses)
    }

    /// The verse shown for `date`. See [`gita_core::daily`].
    pub async fn verse_of_the_day(&self, date: NaiveDate) -> AccessResult<Option<Verse>> {
        let chapters = self.get_chapters().await?;
        match verse_of_the_day(&chapters, date) {
            Some(key) => self.get_slok(key.chapter, key.verse).await,
            None => Ok(None),
        }
    }
}
