//! Remote content client for the public verses API.
//!
//! | Method | Path | Payload |
//! |--------|------|---------|
//! | `GET` | `/chapters` | array of chapters |
//! | `GET` | `/chapter/{id}/` | one chapter |
//! | `GET` | `/slok/{chapter}/{verse}` | one verse |
//!
//! [`RemoteSource`] is the seam the access layer depends on; [`HttpSource`]
//! is the reqwest implementation. The client applies a fixed per-request
//! timeout and never retries; a failed request surfaces to the caller.
//! Unexpected statuses come back as a [`StatusError`] inside the
//! `anyhow::Error` so callers that do retry can classify them.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use crate::config::RemoteConfig;

/// Non-success, non-404 HTTP response.
#[derive(Debug, thiserror::Error)]
#[error("GET {url} returned {status}: {body}")]
pub struct StatusError {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl StatusError {
    /// Rate limiting and server errors are worth another attempt.
    pub fn is_transient(&self) -> bool {
        self.status == 429 || (500..600).contains(&self.status)
    }
}

/// Read-only source of raw content payloads.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the JSON at `path` (e.g. `/slok/2/47`).
    ///
    /// `Ok(None)` means the server has no such resource (HTTP 404).
    async fn fetch(&self, path: &str) -> Result<Option<Value>>;

    /// Base URL or other human-readable origin, for logs and `gita sources`.
    fn origin(&self) -> &str;
}

pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<Option<Value>> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StatusError {
                url,
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let value: Value = response
            .json()
            .await
            .with_context(|| format!("GET {} returned invalid JSON", url))?;
        Ok(Some(value))
    }

    fn origin(&self) -> &str {
        &self.base_url
    }
}
