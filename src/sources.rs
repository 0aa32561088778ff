//! Content source status for `gita sources`.

use anyhow::Result;

use crate::cache::FileCache;
use crate::config::{Config, SourceMode};

pub struct SourceStatus {
    pub name: &'static str,
    pub active: bool,
    pub status: String,
    pub detail: String,
}

pub async fn source_statuses(config: &Config) -> Result<Vec<SourceStatus>> {
    let mode = config.source.mode;

    let bundle = match &config.bundle {
        Some(b) if b.path.exists() => ("OK", b.path.display().to_string()),
        Some(b) => ("MISSING", b.path.display().to_string()),
        None => ("NOT CONFIGURED", String::new()),
    };

    let remote = match &config.remote {
        Some(r) => ("OK", r.base_url.clone()),
        None => ("NOT CONFIGURED", String::new()),
    };

    let cache = match &config.cache {
        Some(c) => {
            let entries = FileCache::new(&c.dir).entry_count().await?;
            ("OK", format!("{} ({} entries)", c.dir.display(), entries))
        }
        None => ("NOT CONFIGURED", String::new()),
    };

    Ok(vec![
        SourceStatus {
            name: "bundle",
            active: mode == SourceMode::Bundled,
            status: bundle.0.to_string(),
            detail: bundle.1,
        },
        SourceStatus {
            name: "remote",
            active: mode == SourceMode::Remote,
            status: remote.0.to_string(),
            detail: remote.1,
        },
        SourceStatus {
            name: "cache",
            active: mode == SourceMode::Remote,
            status: cache.0.to_string(),
            detail: cache.1,
        },
    ])
}

pub async fn list_sources(config: &Config) -> Result<()> {
    println!("{:<10} {:<8} {:<16} DETAIL", "SOURCE", "ACTIVE", "STATUS");
    for s in source_statuses(config).await? {
        println!(
            "{:<10} {:<8} {:<16} {}",
            s.name,
            if s.active { "yes" } else { "no" },
            s.status,
            s.detail
        );
    }
    Ok(())
}
