use std::time::Duration;

use cardsync::sync::{SyncSummary, run_dry_sync};
use cardsync::{FullSyncOptions, FullSyncResult, NameSyncResult};
use tabled::Tabled;

use crate::commands::shared::{
    OutputFormat, build_client, build_sync, display_item_errors, print_json, spawn_reporter,
    table,
};
use crate::config::Config;

/// Flags of `cardsync sync`.
pub(crate) struct SyncArgs {
    pub(crate) name: Option<String>,
    pub(crate) delay_ms: Option<u64>,
    pub(crate) dry_run: bool,
    pub(crate) output: OutputFormat,
}

#[derive(Debug, Tabled)]
struct SyncRow {
    #[tabled(rename = "Fetched")]
    fetched: usize,
    #[tabled(rename = "New")]
    saved: String,
    #[tabled(rename = "Updated")]
    updated: String,
    #[tabled(rename = "Failed")]
    errors: String,
}

impl SyncRow {
    fn new(fetched: usize, summary: Option<&SyncSummary>) -> Self {
        let count = |f: fn(&SyncSummary) -> usize| summary.map_or("-".to_string(), |s| f(s).to_string());
        Self {
            fetched,
            saved: count(|s| s.saved),
            updated: count(|s| s.updated),
            errors: count(|s| s.errors),
        }
    }
}

/// Run a full (or name-filtered) catalog sync.
///
/// A dry run only needs the catalog: the database is never opened.
/// Returns whether the run succeeded.
pub(crate) async fn handle_sync(
    args: SyncArgs,
    config: &Config,
    database_url: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let options = FullSyncOptions {
        name: args.name,
        delay: args
            .delay_ms
            .map_or_else(|| config.sync.delay(), Duration::from_millis),
        dry_run: args.dry_run,
    };

    let result = if options.dry_run {
        let client = build_client(config)?;
        let (tx, reporter) = spawn_reporter();
        let result = run_dry_sync(&client, &options, Some(&tx)).await;
        drop(tx);
        reporter.await?;
        result
    } else {
        let sync = build_sync(config, database_url).await?;
        let (tx, reporter) = spawn_reporter();
        let result = sync.run_full_sync(&options, Some(&tx)).await;
        drop(tx);
        reporter.await?;
        result
    };

    print_full_result(&result, args.output)?;
    Ok(result.success)
}

/// Sync the cards matching one name.
///
/// Returns whether the run succeeded.
pub(crate) async fn handle_card(
    name: &str,
    output: OutputFormat,
    config: &Config,
    database_url: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let sync = build_sync(config, database_url).await?;

    let (tx, reporter) = spawn_reporter();
    let result = sync.run_name_sync(name, Some(&tx)).await;
    drop(tx);
    reporter.await?;

    print_name_result(name, &result, output)?;
    Ok(result.success)
}

fn print_full_result(
    result: &FullSyncResult,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        OutputFormat::Json => print_json(result)?,
        OutputFormat::Table => {
            if let Some(error) = &result.error {
                eprintln!("Sync failed: {error}");
                return Ok(());
            }
            if result.dry_run {
                println!("Dry run: nothing was saved.");
            }
            println!(
                "{}",
                table([SyncRow::new(result.items_fetched, result.summary.as_ref())])
            );
            if let Some(summary) = &result.summary {
                display_item_errors(&summary.error_details);
            }
        }
    }
    Ok(())
}

fn print_name_result(
    name: &str,
    result: &NameSyncResult,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        OutputFormat::Json => print_json(result)?,
        OutputFormat::Table => {
            if let Some(error) = &result.error {
                eprintln!("Sync of '{name}' failed: {error}");
                return Ok(());
            }
            if result.items_fetched == 0 {
                println!("No cards match '{name}'.");
                return Ok(());
            }
            println!(
                "{}",
                table([SyncRow::new(result.items_fetched, result.summary.as_ref())])
            );
            if let Some(summary) = &result.summary {
                display_item_errors(&summary.error_details);
            }
        }
    }
    Ok(())
}
