//! Card entity - the local projection of a remote catalog item.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Card model - one row per distinct external identifier.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    // ─── Identity ────────────────────────────────────────────────────────────
    /// Identifier assigned by the remote catalog. Unique.
    #[sea_orm(unique)]
    pub external_id: String,

    // ─── Display ─────────────────────────────────────────────────────────────
    /// Card name.
    pub name: String,
    /// Collector number within its set.
    pub number: Option<String>,
    /// Rarity label.
    pub rarity: Option<String>,
    /// Card type.
    pub card_type: Option<String>,
    /// Name of the set the card belongs to.
    pub set_name: Option<String>,

    // ─── Text ────────────────────────────────────────────────────────────────
    /// Effect text.
    #[sea_orm(column_type = "Text", nullable)]
    pub effect: Option<String>,
    /// Description. Falls back to the effect text when the catalog has none.
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    // ─── Images ──────────────────────────────────────────────────────────────
    #[sea_orm(column_type = "Text", nullable)]
    pub image_small: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub image_large: Option<String>,
    /// Primary image URL. Falls back to the large image when the catalog has none.
    #[sea_orm(column_type = "Text", nullable)]
    pub image_url: Option<String>,

    // ─── Gameplay ────────────────────────────────────────────────────────────
    /// Energy cost descriptor, stored as the catalog sent it.
    #[sea_orm(column_type = "Json", nullable)]
    pub energy_cost: Option<Json>,

    /// Remote fields with no dedicated column.
    #[sea_orm(column_type = "Json")]
    pub metadata: Json,

    // ─── Tracking ────────────────────────────────────────────────────────────
    /// When the record was first inserted.
    pub created_at: DateTimeWithTimeZone,
    /// When the record was last written by a sync.
    pub synced_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Name for display, with the external id in brackets.
    pub fn label(&self) -> String {
        format!("{} [{}]", self.name, self.external_id)
    }
}
