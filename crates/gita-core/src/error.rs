//! Typed errors for the access layer and the reading tracker.
//!
//! A missing chapter or verse is not an error: lookups return `Option` and
//! `None` is the not-found signal. Everything here is something the caller
//! has to surface or decide on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    /// A chapter or verse payload failed validation at the load/fetch boundary.
    #[error("invalid record for {key}: {reason}")]
    InvalidRecord { key: String, reason: String },

    /// The remote content client failed for this cache key.
    #[error("fetch failed for {key}: {source}")]
    FetchFailed {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Reading or writing local persistent storage failed.
    #[error("storage failure for {key}: {source}")]
    StorageFailure {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// The chapter list could not be produced by any configured source.
    #[error("chapter list unavailable: {0}")]
    DataUnavailable(String),

    #[error("daily target must be between 1 and 20, got {0}")]
    InvalidTarget(u32),
}

impl AccessError {
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        AccessError::InvalidRecord {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn storage(key: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AccessError::StorageFailure {
            key: key.into(),
            source: source.into(),
        }
    }

    pub fn fetch(key: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AccessError::FetchFailed {
            key: key.into(),
            source: source.into(),
        }
    }
}

pub type AccessResult<T> = std::result::Result<T, AccessError>;
