use cardsync::CatalogStats;
use cardsync::repository::FieldCount;
use sea_orm::DatabaseConnection;
use tabled::Tabled;

use crate::commands::shared::{OutputFormat, print_json, table};

#[derive(Debug, Tabled)]
struct CountRow {
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Cards")]
    count: u64,
}

impl From<&FieldCount> for CountRow {
    fn from(entry: &FieldCount) -> Self {
        Self {
            value: entry.value.clone().unwrap_or_else(|| "(none)".to_string()),
            count: entry.count,
        }
    }
}

/// Print totals and breakdowns of the local catalog.
///
/// Read-only: the schema is never created or migrated here, so a database
/// that was never migrated is reported as an error.
pub(crate) async fn handle_stats(
    database_url: &str,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = cardsync::connect(database_url).await?;
    let stats = load_stats(&db).await?;
    print_stats(&stats, output)
}

async fn load_stats(db: &DatabaseConnection) -> Result<CatalogStats, Box<dyn std::error::Error>> {
    cardsync::repository::stats(db)
        .await
        .map_err(|e| -> Box<dyn std::error::Error> {
            format!("Could not read the local catalog ({e}). Run `cardsync migrate up` first.")
                .into()
        })
}

fn print_stats(stats: &CatalogStats, output: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        OutputFormat::Json => print_json(stats)?,
        OutputFormat::Table => print!("{}", render_tables(stats)),
    }
    Ok(())
}

fn render_tables(stats: &CatalogStats) -> String {
    let mut out = format!("Total cards: {}\n", stats.total_records);
    for (title, counts) in [
        ("By rarity", &stats.by_rarity),
        ("By type", &stats.by_type),
        ("By set", &stats.by_set),
    ] {
        if counts.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{title}\n"));
        out.push_str(&table(counts.iter().map(CountRow::from)));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use cardsync::migration::{Migrator, MigratorTrait};

    use super::*;

    #[tokio::test]
    async fn stats_on_unmigrated_database_is_an_error() {
        let db = cardsync::connect("sqlite::memory:").await.expect("connect");

        let err = load_stats(&db)
            .await
            .err()
            .expect("missing table should fail");
        assert!(err.to_string().contains("migrate up"));

        let pending = Migrator::get_pending_migrations(&db).await.expect("status");
        assert!(!pending.is_empty(), "stats must not apply migrations");
    }

    #[tokio::test]
    async fn stats_after_migration_reads_empty_catalog() {
        let db = cardsync::connect("sqlite::memory:").await.expect("connect");
        Migrator::up(&db, None).await.expect("migrate");

        let stats = load_stats(&db).await.expect("stats");
        assert_eq!(stats.total_records, 0);
    }

    #[tokio::test]
    async fn handle_stats_does_not_migrate() {
        assert!(handle_stats("sqlite::memory:", OutputFormat::Json).await.is_err());
    }

    #[test]
    fn empty_catalog_prints_only_total() {
        let rendered = render_tables(&CatalogStats::default());
        assert_eq!(rendered, "Total cards: 0\n");
    }

    #[test]
    fn breakdowns_render_missing_values_as_none() {
        let stats = CatalogStats {
            total_records: 3,
            by_rarity: vec![
                FieldCount {
                    value: Some("Rare".to_string()),
                    count: 2,
                },
                FieldCount {
                    value: None,
                    count: 1,
                },
            ],
            by_type: Vec::new(),
            by_set: Vec::new(),
        };

        let rendered = render_tables(&stats);
        assert!(rendered.starts_with("Total cards: 3\n"));
        assert!(rendered.contains("By rarity"));
        assert!(rendered.contains("(none)"));
        assert!(!rendered.contains("By type"));
    }
}
