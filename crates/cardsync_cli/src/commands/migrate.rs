use cardsync::db;
use cardsync::migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tabled::Tabled;

use crate::MigrateAction;
use crate::commands::shared::table;

#[derive(Debug, Tabled)]
struct MigrationRow {
    #[tabled(rename = "Migration")]
    name: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

pub(crate) async fn handle_migrate(
    action: MigrateAction,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;

    match action {
        MigrateAction::Up => {
            let pending = Migrator::get_pending_migrations(&db).await?.len();
            if pending == 0 {
                println!("Schema is up to date.");
                return Ok(());
            }
            println!("Applying {pending} migration(s)...");
            Migrator::up(&db, None).await?;
            println!("Migrations applied successfully.");
        }
        MigrateAction::Down => {
            println!("Rolling back last migration...");
            Migrator::down(&db, Some(1)).await?;
            println!("Rollback complete.");
        }
        MigrateAction::Status => {
            println!("{}", table(migration_rows(&db).await?));
        }
        MigrateAction::Fresh => {
            println!("Dropping all tables and reapplying migrations...");
            Migrator::fresh(&db).await?;
            println!("Fresh migration complete.");
        }
    }

    Ok(())
}

async fn migration_rows(
    db: &DatabaseConnection,
) -> Result<Vec<MigrationRow>, Box<dyn std::error::Error>> {
    let applied = Migrator::get_applied_migrations(db).await?;
    let pending = Migrator::get_pending_migrations(db).await?;

    let rows = applied
        .iter()
        .map(|m| (m, "applied"))
        .chain(pending.iter().map(|m| (m, "pending")))
        .map(|(m, status)| MigrationRow {
            name: m.name().to_string(),
            status,
        })
        .collect();
    Ok(rows)
}
