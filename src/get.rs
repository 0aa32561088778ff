//! Chapter and verse display for the CLI.
//!
//! Each `run_*` function resolves content through the [`Library`], decorates
//! it with the reader's progress from the [`ReadingTracker`], and prints to
//! stdout. Formatting lives in the `render_*` helpers so it can be tested
//! without a terminal.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use gita_core::models::{Chapter, Verse};
use gita_core::store::KvStore;
use gita_core::tracker::ReadingTracker;

use crate::library::Library;

fn marker(on: bool, symbol: char) -> char {
    if on {
        symbol
    } else {
        ' '
    }
}

/// One row of the chapter list: number, name, meaning, read progress.
pub fn render_chapter_row(chapter: &Chapter, read: u32) -> String {
    format!(
        "{:>3}  {:<24} {:<36} {:>3} / {:<3}",
        chapter.chapter_number,
        chapter.display_name(),
        chapter.meaning.en,
        read,
        chapter.verses_count
    )
}

/// Full verse block: reference, text, transliteration, translations.
pub fn render_verse(verse: &Verse, favorite: bool, read: bool) -> String {
    let mut out = format!(
        "{}.{} {}{}\n\n{}\n",
        verse.chapter,
        verse.verse,
        marker(favorite, '*'),
        marker(read, '✓'),
        verse.text.trim()
    );
    if let Some(translit) = verse.transliteration.as_deref() {
        out.push('\n');
        out.push_str(translit.trim());
        out.push('\n');
    }
    if let Some(hindi) = verse.hindi() {
        out.push_str(&format!("\n[hi] {}\n", hindi.trim()));
    }
    if let Some(english) = verse.english() {
        out.push_str(&format!("\n[en] {}\n", english.trim()));
    }
    out
}

pub async fn run_chapters<S: KvStore>(library: &Library, tracker: &ReadingTracker<S>) -> Result<()> {
    let chapters = library.get_chapters().await?;
    for chapter in &chapters {
        let (read, _) = tracker
            .chapter_progress(chapter.chapter_number, chapter.verses_count)
            .await?;
        println!("{}", render_chapter_row(chapter, read));
    }
    Ok(())
}

pub async fn run_chapter<S: KvStore>(
    library: &Library,
    tracker: &ReadingTracker<S>,
    id: &str,
) -> Result<()> {
    let Some(chapter) = library.get_chapter(id).await? else {
        bail!("chapter not found: {}", id);
    };
    let read = tracker.read_verses(chapter.chapter_number).await?;

    println!(
        "Chapter {}: {} ({})",
        chapter.chapter_number,
        chapter.display_name(),
        chapter.meaning.en
    );
    println!("{}", "=".repeat(40));
    if !chapter.summary.en.is_empty() {
        println!();
        println!("{}", chapter.summary.en.trim());
    }
    println!();
    println!(
        "  {} verses, {} read",
        chapter.verses_count,
        read.len()
    );
    let marks: String = (1..=chapter.verses_count)
        .map(|v| if read.contains(&v) { '✓' } else { '·' })
        .collect();
    println!("  {}", marks);
    Ok(())
}

async fn print_verse<S: KvStore>(tracker: &ReadingTracker<S>, verse: &Verse) -> Result<()> {
    let favorite = tracker.is_favorite(verse.chapter, verse.verse).await?;
    let read = tracker.is_read(verse.chapter, verse.verse).await?;
    print!("{}", render_verse(verse, favorite, read));
    Ok(())
}

/// Print a verse the reader opened and move the last-read pointer to it.
async fn view_verse<S: KvStore>(
    tracker: &ReadingTracker<S>,
    verse: &Verse,
    viewed_at: i64,
) -> Result<()> {
    print_verse(tracker, verse).await?;
    tracker
        .set_last_read(verse.chapter, verse.verse, viewed_at)
        .await?;
    Ok(())
}

/// `viewed_at` is unix millis, stored as the last-read timestamp.
pub async fn run_slok<S: KvStore>(
    library: &Library,
    tracker: &ReadingTracker<S>,
    chapter: &str,
    verse: &str,
    viewed_at: i64,
) -> Result<()> {
    match library.get_slok(chapter, verse).await? {
        Some(v) => view_verse(tracker, &v, viewed_at).await,
        None => bail!("verse not found: {}.{}", chapter, verse),
    }
}

pub async fn run_today<S: KvStore>(
    library: &Library,
    tracker: &ReadingTracker<S>,
    today: NaiveDate,
    viewed_at: i64,
) -> Result<()> {
    match library.verse_of_the_day(today).await? {
        Some(v) => {
            println!("Verse of the day ({})", today.format("%Y-%m-%d"));
            println!();
            view_verse(tracker, &v, viewed_at).await
        }
        None => bail!("no verses available"),
    }
}

/// Resume from the last-read pointer.
pub async fn run_continue<S: KvStore>(library: &Library, tracker: &ReadingTracker<S>) -> Result<()> {
    let Some(last) = tracker.get_last_read().await? else {
        println!("Nothing read yet. Start with `gita chapter 1`.");
        return Ok(());
    };
    let when = chrono::DateTime::from_timestamp_millis(last.timestamp)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| last.timestamp.to_string());
    println!("Last read {}.{} at {}", last.chapter, last.verse, when);
    println!();
    match library.get_slok(last.chapter, last.verse).await? {
        Some(v) => print_verse(tracker, &v).await,
        None => bail!("verse not found: {}.{}", last.chapter, last.verse),
    }
}

pub async fn run_favorites<S: KvStore>(library: &Library, tracker: &ReadingTracker<S>) -> Result<()> {
    let favorites = tracker.favorites().await?;
    if favorites.is_empty() {
        println!("No favorites yet.");
        return Ok(());
    }
    for key in favorites {
        let preview = match library.get_slok(key.chapter, key.verse).await? {
            Some(verse) => verse
                .english()
                .unwrap_or(verse.text.as_str())
                .lines()
                .next()
                .unwrap_or_default()
                .to_string(),
            None => "(not available)".to_string(),
        };
        println!("{:>6}  {}", key.to_string().replace('_', "."), preview);
    }
    Ok(())
}
