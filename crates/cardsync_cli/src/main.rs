//! cardsync CLI - mirror a remote card catalog into a local database.

mod commands;
mod config;
mod progress;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

use crate::commands::shared::OutputFormat;
use crate::commands::sync::SyncArgs;

#[derive(Parser)]
#[command(name = "cardsync")]
#[command(version)]
#[command(about = "Mirror a paginated card catalog into a local database")]
#[command(
    long_about = "cardsync walks a remote card catalog page by page, retrying throttled and \
failed pages, and stores every card in a local database keyed by its catalog identifier. \
Running a sync again overwrites existing cards with the latest remote values."
)]
#[command(after_long_help = r#"EXAMPLES
    Create the local schema:
        $ cardsync migrate up

    Sync the whole catalog:
        $ cardsync sync

    Sync slowly against a strict API:
        $ cardsync sync --delay-ms 1000

    See how many cards would be fetched without saving anything:
        $ cardsync sync --dry-run

    Refresh every card named like "Ember Drake":
        $ cardsync card "Ember Drake"

    Show what is stored locally:
        $ cardsync stats --output json

    Generate shell completions:
        $ cardsync completions bash > ~/.local/share/bash-completion/completions/cardsync

CONFIGURATION
    cardsync reads configuration from:
      1. ~/.config/cardsync/config.toml (or $XDG_CONFIG_HOME/cardsync/config.toml)
      2. ./cardsync.toml
      3. Environment variables (CARDSYNC_* prefix, see below)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    CARDSYNC_DATABASE__URL        Database connection string (default: ~/.local/state/cardsync/cardsync.db)
    CARDSYNC_CATALOG__BASE_URL    Catalog API root, e.g. https://api.example.com/v1
    CARDSYNC_CATALOG__API_KEY     Bearer token for the catalog API
    CARDSYNC_CATALOG__PAGE_SIZE   Items requested per page (default: 100)
    CARDSYNC_SYNC__DELAY_MS       Pause between pages in ms (default: 100)
    CARDSYNC_SYNC__MAX_RETRIES    Retry cap per page, 0 for none (default: 0)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Fetch the catalog and save every card locally
    Sync {
        /// Only sync cards matching this name
        #[arg(short, long)]
        name: Option<String>,

        /// Pause between page requests in milliseconds (failed pages wait twice as long)
        #[arg(short, long)]
        delay_ms: Option<u64>,

        /// Fetch and count only, without saving
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Sync the cards matching one name
    Card {
        /// Card name to match
        name: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Show totals and breakdowns of the local catalog
    Stats {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Check that the catalog API is reachable (exit code 1 if not)
    Ping,
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// List applied and pending migrations
    Status,
    /// Drop all tables and reapply all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Structured logging only when progress bars are not drawn
    if !Term::stdout().is_term() {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("cardsync=info,cardsync_cli=info"));

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config = config::Config::load();
    let cli = Cli::parse();

    // Commands that need neither the catalog nor the database
    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Ping => {
            let reachable = commands::ping::handle_ping(&config).await?;
            return Ok(exit_code(reachable));
        }
        _ => {}
    }

    let database_url = config
        .database_url()
        .ok_or("Could not determine a database URL; set [database] url or CARDSYNC_DATABASE__URL")?;

    let success = match cli.command {
        Commands::Migrate { action } => {
            commands::shared::ensure_sqlite_dir(&database_url)?;
            commands::migrate::handle_migrate(action, &database_url).await?;
            true
        }
        Commands::Sync {
            name,
            delay_ms,
            dry_run,
            output,
        } => {
            let args = SyncArgs {
                name,
                delay_ms,
                dry_run,
                output,
            };
            commands::sync::handle_sync(args, &config, &database_url).await?
        }
        Commands::Card { name, output } => {
            commands::sync::handle_card(&name, output, &config, &database_url).await?
        }
        Commands::Stats { output } => {
            commands::stats::handle_stats(&database_url, output).await?;
            true
        }
        Commands::Ping | Commands::Completions { .. } | Commands::Man { .. } => true,
    };

    Ok(exit_code(success))
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
