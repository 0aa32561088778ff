//! Verse of the day.
//!
//! The pick is a pure function of the calendar date and the chapter list:
//! the day number modulo the total verse count indexes into the verses in
//! reading order. Every device shows the same verse on the same day, and the
//! selection walks the whole text before repeating.

use chrono::{Datelike, NaiveDate};

use crate::models::{Chapter, VerseKey};

/// Total verse count across the given chapters.
pub fn total_verses(chapters: &[Chapter]) -> u32 {
    chapters.iter().map(|c| c.verses_count).sum()
}

/// The verse at position `index` (0-based) in reading order.
pub fn verse_at(chapters: &[Chapter], index: u32) -> Option<VerseKey> {
    let mut ordered: Vec<&Chapter> = chapters.iter().collect();
    ordered.sort_by_key(|c| c.chapter_number);

    let mut remaining = index;
    for chapter in ordered {
        if remaining < chapter.verses_count {
            return Some(VerseKey::new(chapter.chapter_number, remaining + 1));
        }
        remaining -= chapter.verses_count;
    }
    None
}

pub fn verse_of_the_day(chapters: &[Chapter], date: NaiveDate) -> Option<VerseKey> {
    let total = total_verses(chapters);
    if total == 0 {
        return None;
    }
    let index = date.num_days_from_ce().rem_euclid(total as i32) as u32;
    verse_at(chapters, index)
}
