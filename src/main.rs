//! # Gita Companion CLI (`gita`)
//!
//! ## Usage
//!
//! ```bash
//! gita --config ./config/gita.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `gita init` | Create the progress database |
//! | `gita sources` | Show the configured content sources |
//! | `gita chapters` | List chapters with read progress |
//! | `gita chapter <id>` | Show one chapter |
//! | `gita slok <c> <v>` | Show one verse (moves the last-read pointer) |
//! | `gita today` | Verse of the day (moves the last-read pointer) |
//! | `gita read <c> <v>` | Mark a verse read (and count it toward today) |
//! | `gita favorite <c> <v>` | Favorite a verse |
//! | `gita favorites` | List favorites |
//! | `gita continue` | Resume from the last verse read |
//! | `gita practice` | Daily goal and streak |
//! | `gita stats` | Full progress overview |
//! | `gita theme` | Show or change the theme preference |
//! | `gita normalize` | Rewrite legacy read flags |
//! | `gita clear --yes` | Erase all reading progress |
//! | `gita cache clear` | Empty the on-device content cache |
//! | `gita fetch-bundle --out <path>` | Download the bundled dataset |
//! | `gita serve` | Start the HTTP mirror |

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use gita_core::tracker::ReadingTracker;

use gita_companion::cache::FileCache;
use gita_companion::config::{self, Config};
use gita_companion::fetch_bundle::{fetch_bundle, FetchOptions};
use gita_companion::library::Library;
use gita_companion::prefs::Preferences;
use gita_companion::progress::ProgressMode;
use gita_companion::remote::HttpSource;
use gita_companion::sqlite_kv::SqliteKv;
use gita_companion::{get, logging, migrate, server, sources, stats};

/// Gita Companion: a local-first Bhagavad Gita reader with daily practice.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/gita.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "gita",
    about = "Gita Companion: read the Bhagavad Gita, track progress, keep a daily practice",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/gita.toml")]
    config: PathBuf,

    /// Debug logging on stderr (overrides GITA_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the progress database. Safe to run repeatedly.
    Init,

    /// Show which content sources are configured and active.
    Sources,

    /// List all chapters with read progress.
    Chapters,

    /// Show one chapter's details and which verses are read.
    Chapter { id: String },

    /// Show one verse and make it the last one read.
    Slok { chapter: String, verse: String },

    /// Show the verse of the day.
    Today,

    /// Mark a verse as read. Counts toward today's practice and moves the
    /// last-read pointer.
    Read {
        chapter: String,
        verse: String,

        /// Mark as unread instead.
        #[arg(long)]
        unread: bool,
    },

    /// Favorite a verse.
    Favorite {
        chapter: String,
        verse: String,

        /// Remove from favorites instead.
        #[arg(long)]
        remove: bool,
    },

    /// List favorite verses.
    Favorites,

    /// Show the last verse read.
    Continue,

    /// Today's reading goal and current streak.
    Practice {
        /// Set the daily target (1-20) first.
        #[arg(long)]
        target: Option<u32>,
    },

    /// Full reading statistics.
    Stats,

    /// Show or change the theme preference.
    Theme {
        #[arg(long, conflicts_with_all = ["dark", "light"])]
        toggle: bool,
        #[arg(long, conflicts_with = "light")]
        dark: bool,
        #[arg(long)]
        light: bool,
    },

    /// Rewrite legacy "false" read flags as absent keys.
    Normalize,

    /// Erase all reading progress and preferences.
    Clear {
        /// Required; the erase cannot be undone.
        #[arg(long)]
        yes: bool,
    },

    /// Manage the on-device content cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Download every chapter and verse into a bundle file.
    FetchBundle {
        /// Output path for the bundle JSON.
        #[arg(long)]
        out: PathBuf,

        /// Progress output on stderr. Defaults to human when stderr is a TTY.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Serve the verses API from the configured source.
    Serve,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Delete every cached entry.
    Clear,
}

async fn open_tracker(cfg: &Config) -> Result<ReadingTracker<SqliteKv>> {
    let store = SqliteKv::open(cfg).await?;
    Ok(ReadingTracker::new(store).with_default_target(cfg.practice.default_target))
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cfg = config::load_config(&cli.config)?;
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Progress database ready at {}", cfg.storage.path.display());
        }
        Commands::Sources => {
            sources::list_sources(&cfg).await?;
        }
        Commands::Chapters => {
            let library = Library::from_config(&cfg).await?;
            get::run_chapters(&library, &open_tracker(&cfg).await?).await?;
        }
        Commands::Chapter { id } => {
            let library = Library::from_config(&cfg).await?;
            get::run_chapter(&library, &open_tracker(&cfg).await?, &id).await?;
        }
        Commands::Slok { chapter, verse } => {
            let library = Library::from_config(&cfg).await?;
            get::run_slok(&library, &open_tracker(&cfg).await?, &chapter, &verse, now_ms()).await?;
        }
        Commands::Today => {
            let library = Library::from_config(&cfg).await?;
            get::run_today(&library, &open_tracker(&cfg).await?, today, now_ms()).await?;
        }
        Commands::Read {
            chapter,
            verse,
            unread,
        } => {
            let library = Library::from_config(&cfg).await?;
            let Some(v) = library.get_slok(&chapter, &verse).await? else {
                bail!("verse not found: {}.{}", chapter, verse);
            };
            let tracker = open_tracker(&cfg).await?;
            tracker.set_read(v.chapter, v.verse, !unread).await?;
            if unread {
                println!("Marked {}.{} as unread", v.chapter, v.verse);
            } else {
                tracker.record_daily_read(v.chapter, v.verse, today).await?;
                tracker
                    .set_last_read(v.chapter, v.verse, now_ms())
                    .await?;
                let summary = tracker.practice_summary(today).await?;
                println!(
                    "Marked {}.{} as read (today {} / {})",
                    v.chapter, v.verse, summary.today_count, summary.target
                );
            }
        }
        Commands::Favorite {
            chapter,
            verse,
            remove,
        } => {
            let library = Library::from_config(&cfg).await?;
            let Some(v) = library.get_slok(&chapter, &verse).await? else {
                bail!("verse not found: {}.{}", chapter, verse);
            };
            let tracker = open_tracker(&cfg).await?;
            tracker.set_favorite(v.chapter, v.verse, !remove).await?;
            if remove {
                println!("Removed {}.{} from favorites", v.chapter, v.verse);
            } else {
                println!("Added {}.{} to favorites", v.chapter, v.verse);
            }
        }
        Commands::Favorites => {
            let library = Library::from_config(&cfg).await?;
            get::run_favorites(&library, &open_tracker(&cfg).await?).await?;
        }
        Commands::Continue => {
            let library = Library::from_config(&cfg).await?;
            get::run_continue(&library, &open_tracker(&cfg).await?).await?;
        }
        Commands::Practice { target } => {
            stats::run_practice(&open_tracker(&cfg).await?, today, target).await?;
        }
        Commands::Stats => {
            let library = Library::from_config(&cfg).await?;
            stats::run_stats(&cfg, &library, &open_tracker(&cfg).await?, today).await?;
        }
        Commands::Theme {
            toggle,
            dark,
            light,
        } => {
            let store = SqliteKv::open(&cfg).await?;
            let prefs = Preferences::load(&store).await?;
            let changed = if toggle {
                prefs.toggle_theme()
            } else if dark {
                prefs.set_dark_mode(true)
            } else if light {
                prefs.set_dark_mode(false)
            } else {
                false
            };
            if changed {
                prefs.save(&store).await?;
            }
            let theme = if prefs.current().dark_mode { "dark" } else { "light" };
            println!("Theme: {}", theme);
        }
        Commands::Normalize => {
            let removed = open_tracker(&cfg).await?.normalize_read_flags().await?;
            println!("Removed {} legacy read flag(s)", removed);
        }
        Commands::Clear { yes } => {
            if !yes {
                bail!("this erases all reading progress; pass --yes to confirm");
            }
            open_tracker(&cfg).await?.clear_all().await?;
            println!("All reading progress cleared");
        }
        Commands::Cache { action } => match action {
            CacheAction::Clear => {
                let Some(cache_cfg) = &cfg.cache else {
                    bail!("no [cache] section configured");
                };
                let removed = FileCache::new(&cache_cfg.dir).clear().await?;
                println!("Removed {} cached entries from {}", removed, cache_cfg.dir.display());
            }
        },
        Commands::FetchBundle { out, progress } => {
            let remote = HttpSource::new(&cfg.remote_or_default())?;
            let reporter = progress
                .unwrap_or_else(ProgressMode::default_for_tty)
                .reporter();
            let bundle = fetch_bundle(
                &remote,
                &out,
                &FetchOptions::new(cfg.fetch.max_retries),
                reporter.as_ref(),
            )
            .await?;
            println!(
                "Wrote {} ({} chapters, {} verses)",
                out.display(),
                bundle.chapters().len(),
                bundle.verse_count()
            );
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
