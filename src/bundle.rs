//! Static content store: the bundled dataset.
//!
//! The bundle is a single JSON file written by `gita fetch-bundle`:
//!
//! ```json
//! { "chapters": [ { "chapter_number": 1, ... } ],
//!   "sloks": { "1-1": { "chapter": 1, "verse": 1, "slok": "..." } } }
//! ```
//!
//! It is loaded and validated once at startup and never mutated. Lookups are
//! hash-map reads.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use gita_core::error::{AccessError, AccessResult};
use gita_core::models::{Chapter, Verse, VerseKey, CHAPTER_COUNT};
use log::info;
use serde::{Deserialize, Serialize};

/// On-disk shape of the bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleFile {
    pub chapters: Vec<Chapter>,
    pub sloks: BTreeMap<String, Verse>,
}

/// Parsed, validated bundle.
#[derive(Debug, Clone)]
pub struct Bundle {
    chapters: Vec<Chapter>,
    sloks: HashMap<VerseKey, Verse>,
}

fn parse_slok_key(key: &str) -> Option<VerseKey> {
    let (c, v) = key.split_once('-')?;
    Some(VerseKey::new(c.parse().ok()?, v.parse().ok()?))
}

impl Bundle {
    /// Validate a bundle file and index it.
    ///
    /// Checks: every chapter record is valid, chapter numbers are exactly
    /// `1..=18`, every slok key agrees with its record, and each chapter's
    /// verses `1..=verses_count` are all present with nothing extra.
    pub fn from_file(file: BundleFile) -> AccessResult<Self> {
        let mut chapters = file.chapters;
        for chapter in &chapters {
            chapter.validate()?;
        }
        chapters.sort_by_key(|c| c.chapter_number);
        let numbers: Vec<u32> = chapters.iter().map(|c| c.chapter_number).collect();
        let expected: Vec<u32> = (1..=CHAPTER_COUNT).collect();
        if numbers != expected {
            return Err(AccessError::invalid(
                "chapters",
                format!("expected chapters 1..={}, found {:?}", CHAPTER_COUNT, numbers),
            ));
        }

        let mut sloks = HashMap::with_capacity(file.sloks.len());
        for (raw_key, verse) in file.sloks {
            let key = parse_slok_key(&raw_key)
                .ok_or_else(|| AccessError::invalid(raw_key.clone(), "malformed slok key"))?;
            if key != verse.key() {
                return Err(AccessError::invalid(
                    raw_key,
                    format!("record is for {}", verse.key()),
                ));
            }
            verse.validate()?;
            let in_chapter = chapters
                .get(key.chapter.wrapping_sub(1) as usize)
                .is_some_and(|c| c.contains_verse(key.verse));
            if !in_chapter {
                return Err(AccessError::invalid(raw_key, "verse outside its chapter"));
            }
            if sloks.insert(key, verse).is_some() {
                return Err(AccessError::invalid(raw_key, "duplicate verse"));
            }
        }

        for chapter in &chapters {
            for verse in 1..=chapter.verses_count {
                if !sloks.contains_key(&VerseKey::new(chapter.chapter_number, verse)) {
                    return Err(AccessError::invalid(
                        format!("{}-{}", chapter.chapter_number, verse),
                        "verse missing from bundle",
                    ));
                }
            }
        }

        Ok(Self { chapters, sloks })
    }

    pub fn parse(json: &str) -> AccessResult<Self> {
        let file: BundleFile =
            serde_json::from_str(json).map_err(|e| AccessError::invalid("bundle", e.to_string()))?;
        Self::from_file(file)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read bundle: {}", path.display()))?;
        let bundle = Self::parse(&raw)
            .with_context(|| format!("Invalid bundle: {}", path.display()))?;
        info!(
            "loaded bundle {} ({} chapters, {} verses)",
            path.display(),
            bundle.chapters.len(),
            bundle.sloks.len()
        );
        Ok(bundle)
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, number: u32) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.chapter_number == number)
    }

    pub fn slok(&self, chapter: u32, verse: u32) -> Option<&Verse> {
        self.sloks.get(&VerseKey::new(chapter, verse))
    }

    pub fn verse_count(&self) -> usize {
        self.sloks.len()
    }

    /// Back to the on-disk shape, slok keys as `c-v`.
    pub fn to_file(&self) -> BundleFile {
        BundleFile {
            chapters: self.chapters.clone(),
            sloks: self
                .sloks
                .iter()
                .map(|(k, v)| (format!("{}-{}", k.chapter, k.verse), v.clone()))
                .collect(),
        }
    }
}
