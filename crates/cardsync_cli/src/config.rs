//! Configuration file support for cardsync.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `CARDSYNC_`, e.g., `CARDSYNC_CATALOG__API_KEY`)
//! 3. Config file (./cardsync.toml, then ~/.config/cardsync/config.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/cardsync/cardsync.db` on Linux
//! (using the XDG state directory) if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/cardsync/cardsync.db"  # optional, this is the default
//!
//! [catalog]
//! base_url = "https://api.example.com/v1"
//! api_key = "..."  # or use CARDSYNC_CATALOG__API_KEY env var
//! timeout_secs = 30
//! page_size = 100
//!
//! [sync]
//! delay_ms = 100
//! max_retries = 0  # 0 retries transient failures until they succeed
//! ```

use std::path::PathBuf;
use std::time::Duration;

use cardsync::CatalogConfig;
use cardsync::catalog::{DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT};
use cardsync::sync::DEFAULT_DELAY_MS;
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Remote catalog connection.
    pub catalog: CatalogSection,
    /// Default sync options.
    pub sync: SyncConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    pub url: Option<String>,
}

/// Remote catalog configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    /// API root, e.g. `https://api.example.com/v1`.
    pub base_url: Option<String>,
    /// Bearer token. Can also be set via CARDSYNC_CATALOG__API_KEY.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub page_size: u32,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Pause between page requests.
    pub delay_ms: u64,
    /// Cap on retries of one page. Zero means no cap.
    pub max_retries: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            max_retries: 0,
        }
    }
}

impl SyncConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// The retry cap, with zero mapped to unbounded.
    pub fn retry_cap(&self) -> Option<usize> {
        (self.max_retries > 0).then_some(self.max_retries)
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/cardsync/config.toml)
    /// 3. Local config file (./cardsync.toml)
    /// 4. Environment variables with CARDSYNC_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("cardsync.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./cardsync.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // CARDSYNC_CATALOG__BASE_URL -> catalog.base_url
        builder = builder.add_source(environment());

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// The `mode=rwc` parameter creates the SQLite file if it doesn't exist.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("cardsync.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Build the catalog client configuration.
    ///
    /// # Errors
    /// Fails when no base URL is configured.
    pub fn catalog_config(&self) -> Result<CatalogConfig, String> {
        let base_url = self
            .catalog
            .base_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                "No catalog URL configured. Set [catalog] base_url in cardsync.toml \
                 or CARDSYNC_CATALOG__BASE_URL."
                    .to_string()
            })?;

        let mut config = CatalogConfig::new(base_url)
            .with_page_size(self.catalog.page_size)
            .with_max_retries(self.sync.retry_cap());
        config.timeout = Duration::from_secs(self.catalog.timeout_secs);
        if let Some(key) = &self.catalog.api_key {
            config = config.with_api_key(key.clone());
        }
        Ok(config)
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "cardsync").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/cardsync` or `~/.local/state/cardsync`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "cardsync").map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}

/// `CARDSYNC_` prefixed variables. Keys contain underscores (`base_url`), so
/// the section separator is a double underscore only after the section name.
fn environment() -> Environment {
    Environment::with_prefix("CARDSYNC")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
