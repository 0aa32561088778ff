//! # Gita Companion
//!
//! A local-first Bhagavad Gita reading companion: chapter and verse access,
//! favorites, read tracking, and a daily reading practice with streaks.
//!
//! Content comes from one of two sources behind the same [`library::Library`]
//! facade: a bundled JSON dataset, or the public verses API with an
//! on-device cache in front. Reading progress lives in a local SQLite
//! key-value table.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   Bundle    │──▶│   Library    │◀──│ Cache+Remote │
//! │ (gita.json) │   │  (facade)    │   │ (HTTP, JSON) │
//! └─────────────┘   └──────┬───────┘   └──────────────┘
//!                          │
//!             ┌────────────┼─────────────┐
//!             ▼            ▼             ▼
//!       ┌──────────┐ ┌──────────┐  ┌───────────┐
//!       │   CLI    │ │  Mirror  │  │  Tracker  │──▶ SQLite kv
//!       │ (gita)   │ │  (HTTP)  │  │ (progress)│
//!       └──────────┘ └──────────┘  └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! gita fetch-bundle --out ./data/gita.json   # one-time download
//! gita init                                  # create progress database
//! gita chapters
//! gita slok 2 47
//! gita read 2 47
//! gita practice
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | stderr logger for the `log` facade |
//! | [`bundle`] | Bundled dataset loading and validation |
//! | [`cache`] | On-device JSON file cache |
//! | [`remote`] | Remote API client |
//! | [`library`] | Chapter/verse access layer |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_kv`] | SQLite key-value store for progress |
//! | [`prefs`] | Observable UI preferences |
//! | [`fetch_bundle`] | Bundle download with retry |
//! | [`progress`] | Fetch progress reporting |
//! | [`server`] | HTTP mirror of the verses API |
//! | [`get`], [`stats`], [`sources`] | CLI output |
//!
//! Runtime-free models, keys, the tracker, and streak logic live in the
//! `gita-core` crate.

pub mod bundle;
pub mod cache;
pub mod config;
pub mod db;
pub mod fetch_bundle;
pub mod get;
pub mod library;
pub mod logging;
pub mod migrate;
pub mod prefs;
pub mod progress;
pub mod remote;
pub mod server;
pub mod sources;
pub mod sqlite_kv;
pub mod stats;
