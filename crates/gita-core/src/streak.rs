//! Daily-practice streak computation.
//!
//! A day qualifies when the number of distinct verses logged for it is at
//! least the daily target. The current streak walks backward from the most
//! recent logged day and stops at the first day that does not qualify or is
//! not the calendar day before the previous one.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::DailyLog;

fn parse_day(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Logged days with their distinct verse counts, oldest first.
/// Keys that are not ISO dates are skipped.
fn day_counts(log: &DailyLog) -> Vec<(NaiveDate, usize)> {
    let mut days: Vec<(NaiveDate, usize)> = log
        .iter()
        .filter_map(|(key, verses)| {
            let day = parse_day(key)?;
            let distinct: BTreeSet<&String> = verses.iter().collect();
            Some((day, distinct.len()))
        })
        .collect();
    days.sort_by_key(|(day, _)| *day);
    days
}

/// Current streak, counted from the most recent logged day.
pub fn compute_streak(log: &DailyLog, target: u32) -> u32 {
    let target = target.max(1) as usize;
    let mut streak = 0u32;
    let mut newer: Option<NaiveDate> = None;

    for (day, count) in day_counts(log).into_iter().rev() {
        if let Some(next) = newer {
            if next.pred_opt() != Some(day) {
                break;
            }
        }
        if count < target {
            break;
        }
        streak += 1;
        newer = Some(day);
    }

    streak
}

/// Longest run of consecutive qualifying days anywhere in the log.
pub fn longest_streak(log: &DailyLog, target: u32) -> u32 {
    let target = target.max(1) as usize;
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;

    for (day, count) in day_counts(log) {
        let contiguous = prev.and_then(|p| p.succ_opt()) == Some(day);
        if count >= target {
            run = if contiguous { run + 1 } else { 1 };
            longest = longest.max(run);
        } else {
            run = 0;
        }
        prev = Some(day);
    }

    longest
}

/// Share of today's goal reached, as a whole percentage capped at 100.
pub fn goal_percent(count: usize, target: u32) -> u32 {
    let target = target.max(1) as f64;
    ((count as f64 / target) * 100.0).round().min(100.0) as u32
}
