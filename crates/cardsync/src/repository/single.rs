use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entity::card::{ActiveModel, Column, Entity as Card, Model};

use super::errors::{RepositoryError, Result};
use super::validate::validate_card;

// ─── Single Record Operations ────────────────────────────────────────────────

/// Insert a new card.
///
/// A fresh UUID is assigned when the model has no id.
///
/// # Errors
/// Returns `RepositoryError::InvalidInput` if validation fails, or
/// `RepositoryError::Database` if the insert fails (e.g., duplicate external id).
pub async fn insert<C: ConnectionTrait>(db: &C, model: ActiveModel) -> Result<Model> {
    validate_card(&model)?;

    let mut insert_model = model;
    if insert_model.id.is_not_set() {
        insert_model.id = Set(Uuid::new_v4());
    }
    insert_model.insert(db).await.map_err(RepositoryError::from)
}

/// Find a card by its UUID.
pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Model>> {
    Card::find_by_id(id)
        .one(db)
        .await
        .map_err(RepositoryError::from)
}

/// Find a card by the identifier the remote catalog assigned to it.
pub async fn find_by_external_id<C: ConnectionTrait>(
    db: &C,
    external_id: &str,
) -> Result<Option<Model>> {
    Card::find()
        .filter(Column::ExternalId.eq(external_id))
        .one(db)
        .await
        .map_err(RepositoryError::from)
}

/// Overwrite the card stored under `external_id`.
///
/// Every column set on `model` replaces the stored value. The stored id and
/// `created_at` are preserved.
///
/// # Errors
/// Returns `RepositoryError::NotFound` if no card has that external id,
/// `RepositoryError::InvalidInput` if validation fails, or
/// `RepositoryError::Database` if the update fails.
pub async fn update_by_external_id<C: ConnectionTrait>(
    db: &C,
    external_id: &str,
    model: ActiveModel,
) -> Result<Model> {
    let existing = find_by_external_id(db, external_id)
        .await?
        .ok_or_else(|| RepositoryError::not_found_by_external_id(external_id))?;

    update_existing(db, &existing, model).await
}

/// Overwrite `existing` with the columns set on `model`, without looking it
/// up again.
///
/// The id, external id and `created_at` of `existing` are preserved.
///
/// # Errors
/// Returns `RepositoryError::InvalidInput` if validation fails, or
/// `RepositoryError::Database` if the update fails.
pub async fn update_existing<C: ConnectionTrait>(
    db: &C,
    existing: &Model,
    model: ActiveModel,
) -> Result<Model> {
    let mut update_model = model;
    update_model.id = Set(existing.id);
    update_model.external_id = Set(existing.external_id.clone());
    update_model.created_at = ActiveValue::NotSet;

    validate_card(&update_model)?;
    update_model.update(db).await.map_err(RepositoryError::from)
}
