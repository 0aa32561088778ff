//! Stderr logging for the `gita` binary.
//!
//! Library code logs through the `log` facade. The binary installs an
//! `env_logger` backend once at startup so diagnostics land on stderr and
//! stdout stays clean for command output. Level comes from `--verbose` or the
//! `GITA_LOG` environment variable (`error`, `warn`, `info`, `debug`,
//! `trace`, or per-module directives like `gita_companion::library=debug`).

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "GITA_LOG";

/// Build the logger: `--verbose` wins, then the filter in `env`, then `warn`.
pub fn builder(verbose: bool, env: Env<'_>) -> Builder {
    let mut builder = Builder::from_env(env);
    builder.target(Target::Stderr).format_timestamp(None);
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder
}

/// Install the stderr logger. Calling it twice keeps the first logger.
pub fn init(verbose: bool) {
    let _ = builder(verbose, Env::new().filter_or(LOG_ENV, "warn")).try_init();
}
