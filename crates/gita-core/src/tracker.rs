//! Per-user reading progress over a [`KvStore`].
//!
//! Every fact is its own key (see [`crate::keys`]). Storage stays sparse:
//! un-favoriting and un-reading delete the key instead of writing a falsy
//! value. Older installations wrote the literal string `"false"` for unread
//! verses, so reads accept anything other than exactly `"true"` as false and
//! [`ReadingTracker::normalize_read_flags`] cleans those entries up.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use log::{debug, warn};

use crate::error::{AccessError, AccessResult};
use crate::keys::{
    favorite_key, is_read_key, parse_favorite_key, read_chapter_key, read_key, DAILY_LOG_KEY,
    DAILY_TARGET_KEY, LAST_READ_KEY,
};
use crate::models::{DailyLog, LastRead, VerseKey};
use crate::store::KvStore;
use crate::streak::{compute_streak, longest_streak};

pub const DEFAULT_DAILY_TARGET: u32 = 3;
pub const MAX_DAILY_TARGET: u32 = 20;

const TRUE: &str = "true";

/// Streak and goal snapshot for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeSummary {
    pub today_count: usize,
    pub target: u32,
    pub streak: u32,
    pub longest_streak: u32,
}

impl PracticeSummary {
    pub fn goal_met(&self) -> bool {
        self.today_count >= self.target as usize
    }
}

pub struct ReadingTracker<S: KvStore> {
    store: S,
    default_target: u32,
}

fn date_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

impl<S: KvStore> ReadingTracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            default_target: DEFAULT_DAILY_TARGET,
        }
    }

    /// Target used when none has been saved (or the saved one is unreadable).
    pub fn with_default_target(mut self, target: u32) -> Self {
        self.default_target = target.clamp(1, MAX_DAILY_TARGET);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn get(&self, key: &str) -> AccessResult<Option<String>> {
        self.store
            .get(key)
            .await
            .map_err(|e| AccessError::storage(key, e))
    }

    async fn set(&self, key: &str, value: &str) -> AccessResult<()> {
        self.store
            .set(key, value)
            .await
            .map_err(|e| AccessError::storage(key, e))
    }

    async fn remove(&self, key: &str) -> AccessResult<()> {
        self.store
            .remove(key)
            .await
            .map_err(|e| AccessError::storage(key, e))
    }

    async fn flag(&self, key: &str) -> AccessResult<bool> {
        Ok(self.get(key).await?.as_deref() == Some(TRUE))
    }

    async fn set_flag(&self, key: &str, value: bool) -> AccessResult<()> {
        if value {
            self.set(key, TRUE).await
        } else {
            self.remove(key).await
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> AccessResult<Option<T>> {
        let Some(raw) = self.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("ignoring unreadable value under {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn set_json<T: serde::Serialize>(&self, key: &str, value: &T) -> AccessResult<()> {
        let raw = serde_json::to_string(value).map_err(|e| AccessError::storage(key, e))?;
        self.set(key, &raw).await
    }

    // ============ Favorites ============

    pub async fn is_favorite(&self, chapter: u32, verse: u32) -> AccessResult<bool> {
        self.flag(&favorite_key(chapter, verse)).await
    }

    pub async fn set_favorite(&self, chapter: u32, verse: u32, value: bool) -> AccessResult<()> {
        self.set_flag(&favorite_key(chapter, verse), value).await
    }

    /// All favorited verses, ordered by chapter then verse.
    pub async fn favorites(&self) -> AccessResult<Vec<VerseKey>> {
        let keys = self
            .store
            .keys()
            .await
            .map_err(|e| AccessError::storage("favorite_verse_*", e))?;
        let mut favorites = Vec::new();
        for key in keys {
            if let Some(verse) = parse_favorite_key(&key) {
                if self.flag(&key).await? {
                    favorites.push(verse);
                }
            }
        }
        favorites.sort();
        Ok(favorites)
    }

    // ============ Read flags ============

    pub async fn is_read(&self, chapter: u32, verse: u32) -> AccessResult<bool> {
        self.flag(&read_key(chapter, verse)).await
    }

    /// Set the read flag and keep the chapter's read list in step.
    pub async fn set_read(&self, chapter: u32, verse: u32, value: bool) -> AccessResult<()> {
        self.set_flag(&read_key(chapter, verse), value).await?;

        let list_key = read_chapter_key(chapter);
        let mut verses: BTreeSet<u32> = self
            .get_json::<Vec<u32>>(&list_key)
            .await?
            .unwrap_or_default()
            .into_iter()
            .collect();
        let changed = if value {
            verses.insert(verse)
        } else {
            verses.remove(&verse)
        };
        if changed {
            let list: Vec<u32> = verses.into_iter().collect();
            self.set_json(&list_key, &list).await?;
        }
        Ok(())
    }

    /// Verse numbers marked read in a chapter, ascending.
    pub async fn read_verses(&self, chapter: u32) -> AccessResult<Vec<u32>> {
        Ok(self
            .get_json::<Vec<u32>>(&read_chapter_key(chapter))
            .await?
            .unwrap_or_default())
    }

    /// `(read, total)` for a chapter. Counts flags rather than trusting the
    /// list, since older data only carried the per-verse flags.
    pub async fn chapter_progress(&self, chapter: u32, verses_count: u32) -> AccessResult<(u32, u32)> {
        let mut read = 0;
        for verse in 1..=verses_count {
            if self.is_read(chapter, verse).await? {
                read += 1;
            }
        }
        Ok((read, verses_count))
    }

    /// Delete `read_verse_*` entries holding anything other than `"true"`.
    /// Returns the number of entries removed.
    pub async fn normalize_read_flags(&self) -> AccessResult<usize> {
        let keys = self
            .store
            .keys()
            .await
            .map_err(|e| AccessError::storage("read_verse_*", e))?;
        let mut removed = 0;
        for key in keys.iter().filter(|k| is_read_key(k)) {
            if let Some(value) = self.get(key).await? {
                if value != TRUE {
                    debug!("normalizing {} (was {:?})", key, value);
                    self.remove(key).await?;
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    // ============ Daily practice ============

    pub async fn daily_log(&self) -> AccessResult<DailyLog> {
        Ok(self.get_json(DAILY_LOG_KEY).await?.unwrap_or_default())
    }

    /// Log a verse against `today`. Logging the same verse twice on one day
    /// is a no-op. Returns whether the log changed.
    pub async fn record_daily_read(
        &self,
        chapter: u32,
        verse: u32,
        today: NaiveDate,
    ) -> AccessResult<bool> {
        let mut log = self.daily_log().await?;
        let entry = log.entry(date_key(today)).or_default();
        let key = VerseKey::new(chapter, verse).to_string();
        if entry.contains(&key) {
            return Ok(false);
        }
        entry.push(key);
        self.set_json(DAILY_LOG_KEY, &log).await?;
        Ok(true)
    }

    pub async fn today_count(&self, today: NaiveDate) -> AccessResult<usize> {
        let log = self.daily_log().await?;
        Ok(log
            .get(&date_key(today))
            .map(|verses| verses.iter().collect::<BTreeSet<_>>().len())
            .unwrap_or(0))
    }

    pub async fn daily_target(&self) -> AccessResult<u32> {
        let saved = self.get(DAILY_TARGET_KEY).await?;
        Ok(saved
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|t| (1..=MAX_DAILY_TARGET).contains(t))
            .unwrap_or(self.default_target))
    }

    pub async fn set_daily_target(&self, target: u32) -> AccessResult<()> {
        if !(1..=MAX_DAILY_TARGET).contains(&target) {
            return Err(AccessError::InvalidTarget(target));
        }
        self.set(DAILY_TARGET_KEY, &target.to_string()).await
    }

    pub async fn streak(&self) -> AccessResult<u32> {
        let log = self.daily_log().await?;
        Ok(compute_streak(&log, self.daily_target().await?))
    }

    pub async fn practice_summary(&self, today: NaiveDate) -> AccessResult<PracticeSummary> {
        let log = self.daily_log().await?;
        let target = self.daily_target().await?;
        let today_count = log
            .get(&date_key(today))
            .map(|verses| verses.iter().collect::<BTreeSet<_>>().len())
            .unwrap_or(0);
        Ok(PracticeSummary {
            today_count,
            target,
            streak: compute_streak(&log, target),
            longest_streak: longest_streak(&log, target),
        })
    }

    // ============ Last read ============

    pub async fn set_last_read(&self, chapter: u32, verse: u32, timestamp: i64) -> AccessResult<()> {
        let pointer = LastRead {
            chapter,
            verse,
            timestamp,
        };
        self.set_json(LAST_READ_KEY, &pointer).await
    }

    pub async fn get_last_read(&self) -> AccessResult<Option<LastRead>> {
        self.get_json(LAST_READ_KEY).await
    }

    // ============ Housekeeping ============

    /// Erase every key in the store, progress and preferences alike.
    pub async fn clear_all(&self) -> AccessResult<()> {
        self.store
            .clear()
            .await
            .map_err(|e| AccessError::storage("*", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryKv;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_favorite_toggle_removes_key() {
        let tracker = ReadingTracker::new(InMemoryKv::new());
        tracker.set_favorite(2, 47, true).await.unwrap();
        assert!(tracker.is_favorite(2, 47).await.unwrap());
        assert_eq!(
            tracker.store().get("favorite_verse_2_47").await.unwrap().as_deref(),
            Some("true")
        );

        tracker.set_favorite(2, 47, false).await.unwrap();
        assert!(!tracker.is_favorite(2, 47).await.unwrap());
        assert_eq!(tracker.store().get("favorite_verse_2_47").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_favorites_listing_sorted() {
        let tracker = ReadingTracker::new(InMemoryKv::new());
        tracker.set_favorite(12, 13, true).await.unwrap();
        tracker.set_favorite(2, 47, true).await.unwrap();
        tracker.set_favorite(2, 3, true).await.unwrap();
        tracker.store().set("favorite_verse_4_7", "false").await.unwrap();
        assert_eq!(
            tracker.favorites().await.unwrap(),
            vec![VerseKey::new(2, 3), VerseKey::new(2, 47), VerseKey::new(12, 13)]
        );
    }

    #[tokio::test]
    async fn test_read_tolerates_legacy_false() {
        let tracker = ReadingTracker::new(InMemoryKv::new());
        tracker.store().set("read_verse_1_5", "false").await.unwrap();
        tracker.store().set("read_verse_1_6", "TRUE").await.unwrap();
        assert!(!tracker.is_read(1, 5).await.unwrap());
        assert!(!tracker.is_read(1, 6).await.unwrap());

        tracker.set_read(1, 5, true).await.unwrap();
        assert!(tracker.is_read(1, 5).await.unwrap());
    }

    #[tokio::test]
    async fn test_unread_removes_key_and_updates_chapter_list() {
        let tracker = ReadingTracker::new(InMemoryKv::new());
        tracker.set_read(3, 9, true).await.unwrap();
        tracker.set_read(3, 2, true).await.unwrap();
        tracker.set_read(3, 9, true).await.unwrap();
        assert_eq!(tracker.read_verses(3).await.unwrap(), vec![2, 9]);
        assert_eq!(
            tracker.store().get("read_chapter_3").await.unwrap().as_deref(),
            Some("[2,9]")
        );

        tracker.set_read(3, 9, false).await.unwrap();
        assert_eq!(tracker.store().get("read_verse_3_9").await.unwrap(), None);
        assert_eq!(tracker.read_verses(3).await.unwrap(), vec![2]);
        assert_eq!(tracker.chapter_progress(3, 43).await.unwrap(), (1, 43));
    }

    #[tokio::test]
    async fn test_normalize_read_flags() {
        let tracker = ReadingTracker::new(InMemoryKv::new());
        tracker.store().set("read_verse_1_1", "false").await.unwrap();
        tracker.store().set("read_verse_1_2", "true").await.unwrap();
        tracker.store().set("read_verse_1_3", "").await.unwrap();
        tracker.store().set("favorite_verse_1_1", "true").await.unwrap();

        assert_eq!(tracker.normalize_read_flags().await.unwrap(), 2);
        assert_eq!(
            tracker.store().keys().await.unwrap(),
            vec!["favorite_verse_1_1", "read_verse_1_2"]
        );
        assert_eq!(tracker.normalize_read_flags().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_record_daily_read_is_idempotent() {
        let tracker = ReadingTracker::new(InMemoryKv::new());
        let today = day("2024-03-10");
        assert!(tracker.record_daily_read(2, 47, today).await.unwrap());
        assert!(!tracker.record_daily_read(2, 47, today).await.unwrap());
        assert!(tracker.record_daily_read(2, 48, today).await.unwrap());
        assert!(tracker.record_daily_read(2, 47, day("2024-03-11")).await.unwrap());

        let log = tracker.daily_log().await.unwrap();
        assert_eq!(log["2024-03-10"], vec!["2_47", "2_48"]);
        assert_eq!(log["2024-03-11"], vec!["2_47"]);
        assert_eq!(tracker.today_count(today).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_daily_target_defaults_and_validation() {
        let tracker = ReadingTracker::new(InMemoryKv::new());
        assert_eq!(tracker.daily_target().await.unwrap(), DEFAULT_DAILY_TARGET);

        tracker.set_daily_target(5).await.unwrap();
        assert_eq!(tracker.daily_target().await.unwrap(), 5);

        assert!(matches!(
            tracker.set_daily_target(0).await,
            Err(AccessError::InvalidTarget(0))
        ));
        assert!(tracker.set_daily_target(21).await.is_err());

        tracker.store().set("daily_target", "lots").await.unwrap();
        assert_eq!(tracker.daily_target().await.unwrap(), DEFAULT_DAILY_TARGET);

        let custom = ReadingTracker::new(InMemoryKv::new()).with_default_target(7);
        assert_eq!(custom.daily_target().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_practice_summary() {
        let tracker = ReadingTracker::new(InMemoryKv::new());
        tracker.set_daily_target(2).await.unwrap();
        for (d, v) in [("2024-01-01", 1), ("2024-01-01", 2), ("2024-01-02", 3), ("2024-01-02", 4)] {
            tracker.record_daily_read(1, v, day(d)).await.unwrap();
        }
        tracker.record_daily_read(1, 5, day("2024-01-03")).await.unwrap();

        let summary = tracker.practice_summary(day("2024-01-03")).await.unwrap();
        assert_eq!(summary.today_count, 1);
        assert_eq!(summary.target, 2);
        assert_eq!(summary.streak, 0);
        assert_eq!(summary.longest_streak, 2);
        assert!(!summary.goal_met());

        tracker.record_daily_read(1, 6, day("2024-01-03")).await.unwrap();
        assert_eq!(tracker.streak().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_last_read_overwrites() {
        let tracker = ReadingTracker::new(InMemoryKv::new());
        assert_eq!(tracker.get_last_read().await.unwrap(), None);
        tracker.set_last_read(2, 47, 1_000).await.unwrap();
        tracker.set_last_read(3, 1, 2_000).await.unwrap();
        assert_eq!(
            tracker.get_last_read().await.unwrap(),
            Some(LastRead {
                chapter: 3,
                verse: 1,
                timestamp: 2_000
            })
        );
    }

    #[tokio::test]
    async fn test_corrupt_json_values_read_as_absent() {
        let tracker = ReadingTracker::new(InMemoryKv::new());
        tracker.store().set("last_read", "{oops").await.unwrap();
        tracker.store().set("daily_read_log", "[]").await.unwrap();
        assert_eq!(tracker.get_last_read().await.unwrap(), None);
        assert!(tracker.daily_log().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_all_resets_everything() {
        let tracker = ReadingTracker::new(InMemoryKv::new());
        tracker.set_favorite(2, 47, true).await.unwrap();
        tracker.set_read(2, 47, true).await.unwrap();
        tracker.set_last_read(2, 47, 5).await.unwrap();

        tracker.clear_all().await.unwrap();

        assert!(!tracker.is_favorite(2, 47).await.unwrap());
        assert!(!tracker.is_read(2, 47).await.unwrap());
        assert_eq!(tracker.get_last_read().await.unwrap(), None);
        assert!(tracker.store().is_empty());
    }
}
