//! Key derivation for the on-device cache and the progress store.
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `chapters` | cached chapter list |
//! | `chapter-<n>` | cached single chapter |
//! | `slok-<c>-<v>` | cached single verse |
//! | `favorite_verse_<c>_<v>` | `"true"` when favorited, absent otherwise |
//! | `read_verse_<c>_<v>` | `"true"` when read |
//! | `read_chapter_<c>` | JSON array of read verse numbers |
//! | `daily_read_log` | JSON object, date to `c_v` keys |
//! | `last_read` | JSON `{chapter, verse, timestamp}` |
//! | `daily_target` | daily verse goal as a decimal string |
//!
//! All keys are built from validated numbers, so they are safe as file names.

use std::fmt;

use crate::models::VerseKey;

pub const DAILY_LOG_KEY: &str = "daily_read_log";
pub const LAST_READ_KEY: &str = "last_read";
pub const DAILY_TARGET_KEY: &str = "daily_target";

const FAVORITE_PREFIX: &str = "favorite_verse_";
const READ_PREFIX: &str = "read_verse_";
const READ_CHAPTER_PREFIX: &str = "read_chapter_";

/// A key in the on-device content cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Chapters,
    Chapter(u32),
    Slok(u32, u32),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Chapters => write!(f, "chapters"),
            CacheKey::Chapter(n) => write!(f, "chapter-{}", n),
            CacheKey::Slok(c, v) => write!(f, "slok-{}-{}", c, v),
        }
    }
}

impl CacheKey {
    /// Path on the remote verses API that produces this key's payload.
    pub fn remote_path(&self) -> String {
        match self {
            CacheKey::Chapters => "/chapters".to_string(),
            CacheKey::Chapter(n) => format!("/chapter/{}/", n),
            CacheKey::Slok(c, v) => format!("/slok/{}/{}", c, v),
        }
    }
}

pub fn favorite_key(chapter: u32, verse: u32) -> String {
    format!("{}{}_{}", FAVORITE_PREFIX, chapter, verse)
}

pub fn read_key(chapter: u32, verse: u32) -> String {
    format!("{}{}_{}", READ_PREFIX, chapter, verse)
}

pub fn read_chapter_key(chapter: u32) -> String {
    format!("{}{}", READ_CHAPTER_PREFIX, chapter)
}

pub fn parse_favorite_key(key: &str) -> Option<VerseKey> {
    key.strip_prefix(FAVORITE_PREFIX)?.parse().ok()
}

pub fn is_read_key(key: &str) -> bool {
    key.starts_with(READ_PREFIX)
}

/// Coerce a raw identifier (route parameter, CLI argument) to a positive
/// integer. Anything non-numeric, zero, or negative is `None`.
pub fn coerce_id(raw: &str) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}

/// Identifier types the access layer accepts.
///
/// Route parameters arrive as strings and internal callers hold numbers;
/// both go through the same coercion.
pub trait IntoId {
    fn into_id(self) -> Option<u32>;
}

impl IntoId for u32 {
    fn into_id(self) -> Option<u32> {
        (self > 0).then_some(self)
    }
}

impl IntoId for i64 {
    fn into_id(self) -> Option<u32> {
        u32::try_from(self).ok().and_then(<u32 as IntoId>::into_id)
    }
}

impl IntoId for &str {
    fn into_id(self) -> Option<u32> {
        coerce_id(self)
    }
}

impl IntoId for &String {
    fn into_id(self) -> Option<u32> {
        coerce_id(self)
    }
}

impl IntoId for String {
    fn into_id(self) -> Option<u32> {
        coerce_id(&self)
    }
}
