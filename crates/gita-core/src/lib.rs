//! # Gita Core
//!
//! Runtime-free logic for Gita Companion: chapter and verse models, cache and
//! progress key derivation, the key-value store abstraction, the reading
//! tracker (favorites, read flags, daily log, last-read pointer), streak
//! computation, and the verse-of-the-day selection.
//!
//! This crate contains no tokio, filesystem, or network dependencies. All
//! I/O happens behind the [`store::KvStore`] trait, which the native crate
//! implements over SQLite and this crate implements in memory.

pub mod daily;
pub mod error;
pub mod keys;
pub mod models;
pub mod store;
pub mod streak;
pub mod tracker;
