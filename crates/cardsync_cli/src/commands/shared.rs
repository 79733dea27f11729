use std::sync::Arc;

use cardsync::sync::{ItemError, ProgressSender, progress_channel};
use cardsync::{CatalogClient, CatalogSync};
use clap::ValueEnum;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tabled::{Table, Tabled};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::progress::ProgressReporter;

/// Number of per-card failures listed after a run.
const MAX_LISTED_ERRORS: usize = 10;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// Build a catalog client from the configuration.
pub(crate) fn build_client(config: &Config) -> Result<CatalogClient, Box<dyn std::error::Error>> {
    Ok(CatalogClient::new(config.catalog_config()?)?)
}

/// Connect to the database, applying pending migrations, and build a sync
/// over it from the configured catalog.
///
/// The catalog configuration is checked before the database is touched.
pub(crate) async fn build_sync(
    config: &Config,
    database_url: &str,
) -> Result<CatalogSync<DatabaseConnection>, Box<dyn std::error::Error>> {
    let client = build_client(config)?;
    ensure_sqlite_dir(database_url)?;
    let db = cardsync::connect_and_migrate(database_url).await?;
    Ok(CatalogSync::new(client, Arc::new(db)).with_default_delay(config.sync.delay()))
}

/// Create the parent directory of a file-backed SQLite database.
pub(crate) fn ensure_sqlite_dir(database_url: &str) -> std::io::Result<()> {
    let Some(db_path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    // Strip query parameters (e.g., ?mode=rwc) before path operations
    let db_path = db_path.split('?').next().unwrap_or(db_path);
    let db_path = std::path::Path::new(db_path);

    if db_path.is_relative() && !db_path.as_os_str().is_empty() {
        tracing::warn!(
            "Database path '{}' is relative - behavior depends on current directory. \
             Consider using an absolute path.",
            db_path.display()
        );
    }

    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// A progress sender wired to a reporter running on its own task.
///
/// Drop the sender, then await the handle, to flush the last events.
pub(crate) fn spawn_reporter() -> (ProgressSender, JoinHandle<()>) {
    let (tx, rx) = progress_channel();
    let handle = Arc::new(ProgressReporter::new()).spawn(rx);
    (tx, handle)
}

/// Render rows as a rounded table.
pub(crate) fn table<T: Tabled>(rows: impl IntoIterator<Item = T>) -> String {
    let mut table = Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    table.to_string()
}

/// Print `value` as pretty JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Debug, Tabled)]
struct FailedCardRow {
    #[tabled(rename = "Card")]
    name: String,
    #[tabled(rename = "External ID")]
    external_id: String,
    #[tabled(rename = "Error")]
    message: String,
}

/// Print per-card failures to stderr, capped at [`MAX_LISTED_ERRORS`].
pub(crate) fn display_item_errors(errors: &[ItemError]) {
    if errors.is_empty() {
        return;
    }

    let rows = errors.iter().take(MAX_LISTED_ERRORS).map(|e| FailedCardRow {
        name: e.name.clone(),
        external_id: e.external_id.clone(),
        message: e.message.clone(),
    });
    eprintln!("\nFailed to save {} card(s):", errors.len());
    eprintln!("{}", table(rows));
    if errors.len() > MAX_LISTED_ERRORS {
        eprintln!("  ... and {} more errors", errors.len() - MAX_LISTED_ERRORS);
    }
}
