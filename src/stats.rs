//! Reading progress overview.
//!
//! `gita practice` prints today's goal and streak. `gita stats` prints the
//! whole picture: storage, favorites, streaks, and per-chapter read coverage.

use anyhow::Result;
use chrono::NaiveDate;
use gita_core::models::Chapter;
use gita_core::store::KvStore;
use gita_core::streak::goal_percent;
use gita_core::tracker::{PracticeSummary, ReadingTracker};

use crate::config::Config;
use crate::library::Library;

/// Per-chapter read coverage.
struct ChapterStats {
    number: u32,
    name: String,
    read: u32,
    total: u32,
}

/// `[#####.....]` style bar, `width` cells wide.
pub fn progress_bar(done: u32, total: u32, width: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        ((done.min(total) as usize * width) + total as usize / 2) / total as usize
    };
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

pub fn render_practice(summary: &PracticeSummary) -> String {
    let percent = goal_percent(summary.today_count, summary.target);
    let mut out = format!(
        "Today: {} / {} verses ({}%) {}\n",
        summary.today_count,
        summary.target,
        percent,
        progress_bar(summary.today_count as u32, summary.target, 20)
    );
    out.push_str(&format!(
        "Streak: {} day{}",
        summary.streak,
        if summary.streak == 1 { "" } else { "s" }
    ));
    if summary.goal_met() {
        out.push_str("  (goal met)");
    }
    out.push('\n');
    out
}

pub async fn run_practice<S: KvStore>(
    tracker: &ReadingTracker<S>,
    today: NaiveDate,
    target: Option<u32>,
) -> Result<()> {
    if let Some(target) = target {
        tracker.set_daily_target(target).await?;
        println!("Daily target set to {}", target);
    }
    let summary = tracker.practice_summary(today).await?;
    print!("{}", render_practice(&summary));
    Ok(())
}

pub async fn run_stats<S: KvStore>(
    config: &Config,
    library: &Library,
    tracker: &ReadingTracker<S>,
    today: NaiveDate,
) -> Result<()> {
    let chapters: Vec<Chapter> = library.get_chapters().await?;
    let summary = tracker.practice_summary(today).await?;
    let favorites = tracker.favorites().await?;

    let mut chapter_stats = Vec::with_capacity(chapters.len());
    for chapter in &chapters {
        let (read, total) = tracker
            .chapter_progress(chapter.chapter_number, chapter.verses_count)
            .await?;
        chapter_stats.push(ChapterStats {
            number: chapter.chapter_number,
            name: chapter.display_name().to_string(),
            read,
            total,
        });
    }
    let total_read: u32 = chapter_stats.iter().map(|s| s.read).sum();
    let total_verses: u32 = chapter_stats.iter().map(|s| s.total).sum();

    let db_size = std::fs::metadata(&config.storage.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Gita Companion: Reading Stats");
    println!("==============================");
    println!();
    println!("  Storage:     {}", config.storage.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!("  Source:      {}", library.describe());
    println!();
    println!(
        "  Read:        {} / {} ({}%)",
        total_read,
        total_verses,
        if total_verses > 0 {
            (total_read * 100) / total_verses
        } else {
            0
        }
    );
    println!("  Favorites:   {}", favorites.len());
    println!("  Target:      {} / day", summary.target);
    println!("  Today:       {}", summary.today_count);
    println!("  Streak:      {}", summary.streak);
    println!("  Longest:     {}", summary.longest_streak);

    if let Some(last) = tracker.get_last_read().await? {
        println!(
            "  Last read:   {}.{} ({})",
            last.chapter,
            last.verse,
            format_ts_relative(last.timestamp / 1000)
        );
    }

    if !chapter_stats.is_empty() {
        println!();
        println!("  By chapter:");
        println!("  {:>3}  {:<24} {:>9}   {}", "CH", "NAME", "READ", "PROGRESS");
        println!("  {}", "-".repeat(60));
        for s in &chapter_stats {
            println!(
                "  {:>3}  {:<24} {:>4} / {:<3}  {}",
                s.number,
                s.name,
                s.read,
                s.total,
                progress_bar(s.read, s.total, 16)
            );
        }
    }

    println!();
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Format a Unix timestamp (seconds) as e.g. "3 hours ago".
fn format_ts_relative(ts: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let delta = now - ts;

    if delta < 0 {
        return format_ts_iso(ts);
    }

    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if delta < 86400 * 30 {
        let days = delta / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else {
        format_ts_iso(ts)
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}
