//! Initial migration to create the card catalog schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Cards::Id).uuid().not_null().primary_key())
                    // Identity
                    .col(
                        ColumnDef::new(Cards::ExternalId)
                            .string_len(128)
                            .not_null(),
                    )
                    // Display
                    .col(ColumnDef::new(Cards::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Cards::Number).string_len(32).null())
                    .col(ColumnDef::new(Cards::Rarity).string_len(64).null())
                    .col(ColumnDef::new(Cards::CardType).string_len(64).null())
                    .col(ColumnDef::new(Cards::SetName).string_len(200).null())
                    // Text
                    .col(ColumnDef::new(Cards::Effect).text().null())
                    .col(ColumnDef::new(Cards::Description).text().null())
                    // Images
                    .col(ColumnDef::new(Cards::ImageSmall).text().null())
                    .col(ColumnDef::new(Cards::ImageLarge).text().null())
                    .col(ColumnDef::new(Cards::ImageUrl).text().null())
                    // Gameplay
                    .col(ColumnDef::new(Cards::EnergyCost).json().null())
                    .col(
                        ColumnDef::new(Cards::Metadata)
                            .json()
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    // Tracking
                    .col(
                        ColumnDef::new(Cards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Cards::SyncedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per remote identifier
        manager
            .create_index(
                Index::create()
                    .name("idx_cards_external_id")
                    .table(Cards::Table)
                    .col(Cards::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cards_name")
                    .table(Cards::Table)
                    .col(Cards::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cards_set_name")
                    .table(Cards::Table)
                    .col(Cards::SetName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cards::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Cards {
    Table,
    Id,
    ExternalId,
    Name,
    Number,
    Rarity,
    CardType,
    SetName,
    Effect,
    Description,
    ImageSmall,
    ImageLarge,
    ImageUrl,
    EnergyCost,
    Metadata,
    CreatedAt,
    SyncedAt,
}
