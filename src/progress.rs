//! Bundle fetch progress reporting.
//!
//! `gita fetch-bundle` crawls hundreds of verses one request at a time.
//! Progress goes to **stderr** so stdout stays clean for scripts, and is
//! throttled to one line per [`REPORT_EVERY`] verses.

use std::io::Write;

/// Emit a verse progress line every this many verses.
pub const REPORT_EVERY: u64 = 25;

/// A single progress event for a bundle fetch.
#[derive(Clone, Debug)]
pub enum FetchProgressEvent {
    /// Chapter list downloaded.
    Chapters { count: u64 },
    /// `n` of `total` verses downloaded; currently in `chapter`.
    Verses { chapter: u32, n: u64, total: u64 },
    /// A request failed and will be retried after `delay_secs`.
    Retry {
        path: String,
        attempt: u32,
        delay_secs: u64,
    },
}

/// Reports fetch progress. Implementations write to stderr (human or JSON).
pub trait FetchProgressReporter: Send + Sync {
    fn report(&self, event: FetchProgressEvent);
}

/// Human-friendly progress on stderr: "fetch  chapter 2  verses 75 / 700".
pub struct StderrProgress;

impl FetchProgressReporter for StderrProgress {
    fn report(&self, event: FetchProgressEvent) {
        let line = match &event {
            FetchProgressEvent::Chapters { count } => {
                format!("fetch  chapters  {} found\n", format_number(*count))
            }
            FetchProgressEvent::Verses { chapter, n, total } => format!(
                "fetch  chapter {}  verses {} / {}\n",
                chapter,
                format_number(*n),
                format_number(*total)
            ),
            FetchProgressEvent::Retry {
                path,
                attempt,
                delay_secs,
            } => format!(
                "fetch  {}  retry {} in {}s\n",
                path, attempt, delay_secs
            ),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl FetchProgressReporter for JsonProgress {
    fn report(&self, event: FetchProgressEvent) {
        let obj = match &event {
            FetchProgressEvent::Chapters { count } => serde_json::json!({
                "event": "progress",
                "phase": "chapters",
                "count": count
            }),
            FetchProgressEvent::Verses { chapter, n, total } => serde_json::json!({
                "event": "progress",
                "phase": "verses",
                "chapter": chapter,
                "n": n,
                "total": total
            }),
            FetchProgressEvent::Retry {
                path,
                attempt,
                delay_secs,
            } => serde_json::json!({
                "event": "retry",
                "path": path,
                "attempt": attempt,
                "delay_secs": delay_secs
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

pub struct NoProgress;

impl FetchProgressReporter for NoProgress {
    fn report(&self, _event: FetchProgressEvent) {}
}

/// True when verse `n` of `total` should produce a progress line.
pub fn should_report(n: u64, total: u64) -> bool {
    n % REPORT_EVERY == 0 || n == total
}

pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn FetchProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
