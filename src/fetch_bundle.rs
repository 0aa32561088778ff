//! Build the bundled dataset from the remote API.
//!
//! `gita fetch-bundle` downloads `/chapters`, then every verse of every
//! chapter in order, and writes a single JSON file in the shape
//! [`Bundle::load`] expects. The result is validated as a bundle before
//! anything touches the output path, so a partial crawl never replaces a good
//! bundle.
//!
//! # Retry policy
//!
//! - HTTP 429 or 5xx → retry with exponential backoff (1s, 2s, 4s, ... capped at 32s)
//! - Network error → retry
//! - Other non-success status → fail immediately
//! - 404 → fail; the crawl only asks for resources the chapter list promises

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::{info, warn};
use serde_json::Value;

use gita_core::keys::CacheKey;
use gita_core::models::{Chapter, Verse};

use crate::bundle::{Bundle, BundleFile};
use crate::progress::{should_report, FetchProgressEvent, FetchProgressReporter};
use crate::remote::{RemoteSource, StatusError};

pub struct FetchOptions {
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each one after.
    pub base_delay: Duration,
}

impl FetchOptions {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_secs(1),
        }
    }
}

fn is_retryable(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<StatusError>() {
        Some(status) => status.is_transient(),
        None => true,
    }
}

async fn fetch_with_retry(
    remote: &dyn RemoteSource,
    key: CacheKey,
    options: &FetchOptions,
    progress: &dyn FetchProgressReporter,
) -> Result<Value> {
    let path = key.remote_path();
    let mut last_err = None;

    for attempt in 0..=options.max_retries {
        if attempt > 0 {
            let delay = options.base_delay * (1u32 << (attempt - 1).min(5));
            progress.report(FetchProgressEvent::Retry {
                path: path.clone(),
                attempt,
                delay_secs: delay.as_secs(),
            });
            tokio::time::sleep(delay).await;
        }

        match remote.fetch(&path).await {
            Ok(Some(value)) if !value.is_null() => return Ok(value),
            Ok(_) => bail!("{} not found at {}", key, remote.origin()),
            Err(e) if is_retryable(&e) => {
                warn!("{} failed (attempt {}): {:#}", path, attempt + 1, e);
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("{} failed after retries", path)))
}

/// Crawl the remote into a validated [`Bundle`].
pub async fn crawl(
    remote: &dyn RemoteSource,
    options: &FetchOptions,
    progress: &dyn FetchProgressReporter,
) -> Result<Bundle> {
    let raw = fetch_with_retry(remote, CacheKey::Chapters, options, progress).await?;
    let mut chapters: Vec<Chapter> =
        serde_json::from_value(raw).context("Invalid chapter list")?;
    chapters.sort_by_key(|c| c.chapter_number);
    progress.report(FetchProgressEvent::Chapters {
        count: chapters.len() as u64,
    });

    let total: u64 = chapters.iter().map(|c| c.verses_count as u64).sum();
    let mut file = BundleFile {
        chapters: chapters.clone(),
        sloks: Default::default(),
    };

    let mut n = 0u64;
    for chapter in &chapters {
        for v in 1..=chapter.verses_count {
            let key = CacheKey::Slok(chapter.chapter_number, v);
            let raw = fetch_with_retry(remote, key, options, progress).await?;
            let verse: Verse =
                serde_json::from_value(raw).with_context(|| format!("Invalid verse {}", key))?;
            file.sloks
                .insert(format!("{}-{}", chapter.chapter_number, v), verse);

            n += 1;
            if should_report(n, total) {
                progress.report(FetchProgressEvent::Verses {
                    chapter: chapter.chapter_number,
                    n,
                    total,
                });
            }
        }
    }

    Ok(Bundle::from_file(file)?)
}

/// Crawl and write the bundle to `out`. Returns the validated bundle.
pub async fn fetch_bundle(
    remote: &dyn RemoteSource,
    out: &Path,
    options: &FetchOptions,
    progress: &dyn FetchProgressReporter,
) -> Result<Bundle> {
    let bundle = crawl(remote, options, progress).await?;

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let json = serde_json::to_string_pretty(&bundle.to_file())?;
    tokio::fs::write(out, json)
        .await
        .with_context(|| format!("Failed to write bundle: {}", out.display()))?;

    info!(
        "wrote {} ({} chapters, {} verses)",
        out.display(),
        bundle.chapters().len(),
        bundle.verse_count()
    );
    Ok(bundle)
}
