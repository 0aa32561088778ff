//! Chapter and verse records, plus the small value types the reading tracker
//! persists.
//!
//! The JSON shapes match the public verses API (snake_case chapter fields,
//! `slok` for the verse body, one object per commentary source). Records are
//! validated once at the load or fetch boundary; after that they are plain
//! immutable values.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AccessError, AccessResult};

/// Number of chapters in the text. Chapter numbers are `1..=CHAPTER_COUNT`.
pub const CHAPTER_COUNT: u32 = 18;

/// Commentary source preferred for the English rendering.
pub const ENGLISH_SOURCE: &str = "siva";
/// Commentary source preferred for the Hindi rendering.
pub const HINDI_SOURCE: &str = "tej";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Meaning {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub hi: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hi: Option<String>,
}

/// One of the eighteen chapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub chapter_number: u32,
    pub name: String,
    #[serde(default)]
    pub transliteration: String,
    /// English chapter title, when the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default)]
    pub meaning: Meaning,
    #[serde(default)]
    pub summary: Summary,
    pub verses_count: u32,
}

impl Chapter {
    pub fn validate(&self) -> AccessResult<()> {
        let key = format!("chapter-{}", self.chapter_number);
        if !(1..=CHAPTER_COUNT).contains(&self.chapter_number) {
            return Err(AccessError::invalid(key, "chapter_number out of range"));
        }
        if self.verses_count == 0 {
            return Err(AccessError::invalid(key, "verses_count must be >= 1"));
        }
        if self.name.trim().is_empty() {
            return Err(AccessError::invalid(key, "name is empty"));
        }
        Ok(())
    }

    pub fn contains_verse(&self, verse: u32) -> bool {
        (1..=self.verses_count).contains(&verse)
    }

    /// Latin-script title when present, otherwise the original name.
    pub fn display_name(&self) -> &str {
        if self.transliteration.trim().is_empty() {
            &self.name
        } else {
            &self.transliteration
        }
    }
}

/// A single commentary source attached to a verse, e.g. `siva` or `tej`.
///
/// Besides `author`, every field is a language-coded text: `et` English
/// translation, `ec` English commentary, `ht` Hindi translation, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commentary {
    #[serde(default)]
    pub author: String,
    #[serde(flatten)]
    pub texts: BTreeMap<String, String>,
}

/// One verse ("slok").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub chapter: u32,
    pub verse: u32,
    /// Original-language verse body.
    #[serde(rename = "slok")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
    #[serde(flatten)]
    pub commentaries: BTreeMap<String, Commentary>,
}

impl Verse {
    pub fn key(&self) -> VerseKey {
        VerseKey::new(self.chapter, self.verse)
    }

    pub fn validate(&self) -> AccessResult<()> {
        let key = format!("slok-{}-{}", self.chapter, self.verse);
        if !(1..=CHAPTER_COUNT).contains(&self.chapter) {
            return Err(AccessError::invalid(key, "chapter out of range"));
        }
        if self.verse == 0 {
            return Err(AccessError::invalid(key, "verse must be >= 1"));
        }
        if self.text.trim().is_empty() {
            return Err(AccessError::invalid(key, "verse text is empty"));
        }
        Ok(())
    }

    /// English translation: the preferred source first, then any source
    /// carrying an `et` text.
    pub fn english(&self) -> Option<&str> {
        self.rendering(ENGLISH_SOURCE, "et")
    }

    /// Hindi translation, same fallback rule with `ht`.
    pub fn hindi(&self) -> Option<&str> {
        self.rendering(HINDI_SOURCE, "ht")
    }

    /// Every translation present, keyed by `<source>.<lang>`.
    pub fn translations(&self) -> BTreeMap<String, &str> {
        let mut out = BTreeMap::new();
        for (source, commentary) in &self.commentaries {
            for lang in ["et", "ht"] {
                if let Some(text) = commentary.texts.get(lang) {
                    out.insert(format!("{}.{}", source, lang), text.as_str());
                }
            }
        }
        out
    }

    fn rendering(&self, preferred: &str, lang: &str) -> Option<&str> {
        self.commentaries
            .get(preferred)
            .and_then(|c| c.texts.get(lang))
            .or_else(|| self.commentaries.values().find_map(|c| c.texts.get(lang)))
            .map(String::as_str)
    }
}

/// Composite `(chapter, verse)` identifier.
///
/// Displays as `c_v`, the form used in the daily reading log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VerseKey {
    pub chapter: u32,
    pub verse: u32,
}

impl VerseKey {
    pub fn new(chapter: u32, verse: u32) -> Self {
        Self { chapter, verse }
    }
}

impl fmt::Display for VerseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.chapter, self.verse)
    }
}

impl FromStr for VerseKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (c, v) = s
            .split_once('_')
            .ok_or_else(|| format!("invalid verse key: {}", s))?;
        let chapter = c.parse().map_err(|_| format!("invalid chapter in {}", s))?;
        let verse = v.parse().map_err(|_| format!("invalid verse in {}", s))?;
        Ok(VerseKey { chapter, verse })
    }
}

/// The "continue reading" pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastRead {
    pub chapter: u32,
    pub verse: u32,
    /// Unix milliseconds of the view that set it.
    pub timestamp: i64,
}

/// ISO date (`YYYY-MM-DD`) to the `c_v` keys read that day.
pub type DailyLog = BTreeMap<String, Vec<String>>;
