use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use gita_core::tracker::{DEFAULT_DAILY_TARGET, MAX_DAILY_TARGET};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub bundle: Option<BundleConfig>,
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
    #[serde(default)]
    pub cache: Option<CacheConfig>,
    pub storage: StorageConfig,
    #[serde(default)]
    pub practice: PracticeConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Which content variant backs the access layer.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    #[default]
    Bundled,
    Remote,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourceConfig {
    #[serde(default)]
    pub mode: SourceMode,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BundleConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://vedicscriptures.github.io".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PracticeConfig {
    #[serde(default = "default_target")]
    pub default_target: u32,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            default_target: default_target(),
        }
    }
}

fn default_target() -> u32 {
    DEFAULT_DAILY_TARGET
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}

impl Config {
    /// The remote section, falling back to the public API defaults.
    pub fn remote_or_default(&self) -> RemoteConfig {
        self.remote.clone().unwrap_or_default()
    }

    /// Configuration with only a storage path, for commands that never
    /// touch content (progress housekeeping).
    pub fn minimal(storage_path: PathBuf) -> Self {
        Self {
            source: SourceConfig::default(),
            bundle: None,
            remote: None,
            cache: None,
            storage: StorageConfig { path: storage_path },
            practice: PracticeConfig::default(),
            fetch: FetchConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

fn validate(config: &Config) -> Result<()> {
    match config.source.mode {
        SourceMode::Bundled => {
            if config.bundle.is_none() {
                anyhow::bail!("source.mode = \"bundled\" requires a [bundle] section with a path");
            }
        }
        SourceMode::Remote => {
            if config.remote.is_none() {
                anyhow::bail!("source.mode = \"remote\" requires a [remote] section");
            }
            if config.cache.is_none() {
                anyhow::bail!("source.mode = \"remote\" requires a [cache] section with a dir");
            }
        }
    }

    if let Some(remote) = &config.remote {
        if remote.timeout_secs == 0 {
            anyhow::bail!("remote.timeout_secs must be > 0");
        }
        if !remote.base_url.starts_with("http://") && !remote.base_url.starts_with("https://") {
            anyhow::bail!("remote.base_url must be an http(s) URL, got '{}'", remote.base_url);
        }
    }

    if !(1..=MAX_DAILY_TARGET).contains(&config.practice.default_target) {
        anyhow::bail!(
            "practice.default_target must be in [1, {}]",
            MAX_DAILY_TARGET
        );
    }

    Ok(())
}
