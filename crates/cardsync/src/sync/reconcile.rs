//! Reconcile fetched catalog items into the card store.
//!
//! Items are processed strictly in order, one at a time. Each item is looked
//! up by external id and either inserted or fully overwritten. A failing item
//! is recorded in the summary and never stops the run.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{ActiveValue, Set};
use serde_json::Value;

use super::progress::{ItemOutcome, ProgressSender, SyncProgress, emit};
use super::types::{ItemError, ReconciledCard, SyncSummary};
use crate::catalog::RemoteCardItem;
use crate::entity::card::ActiveModel;
use crate::repository::{CardStore, RepositoryError};

/// Recursively remove null values from JSON objects.
fn strip_null_values(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_null_values(v)))
                .collect(),
        ),
        Value::Array(arr) => Value::Array(arr.into_iter().map(strip_null_values).collect()),
        other => other,
    }
}

fn present(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty()).cloned()
}

/// Map a remote item onto a card active model.
///
/// Every mapped column is set, so that a later sync clears fields the catalog
/// stopped sending. `description` falls back to the effect text and
/// `image_url` to the large image. The id is left unset.
pub fn to_active_model(item: &RemoteCardItem, now: DateTime<FixedOffset>) -> ActiveModel {
    let effect = present(item.effect.as_ref());
    let image_small = present(item.images.as_ref().and_then(|i| i.small.as_ref()));
    let image_large = present(item.images.as_ref().and_then(|i| i.large.as_ref()));

    let description = present(item.description.as_ref()).or_else(|| effect.clone());
    let image_url = present(item.image_url.as_ref()).or_else(|| image_large.clone());

    ActiveModel {
        id: ActiveValue::NotSet,
        external_id: Set(present(item.id.as_ref()).unwrap_or_default()),
        name: Set(present(item.name.as_ref()).unwrap_or_default()),
        number: Set(present(item.number.as_ref())),
        rarity: Set(present(item.rarity.as_ref())),
        card_type: Set(present(item.card_type.as_ref())),
        set_name: Set(present(item.set_name.as_ref())),
        effect: Set(effect),
        description: Set(description),
        image_small: Set(image_small),
        image_large: Set(image_large),
        image_url: Set(image_url),
        energy_cost: Set(item.energy_cost.clone().map(strip_null_values)),
        metadata: Set(strip_null_values(Value::Object(item.extra.clone()))),
        created_at: Set(now),
        synced_at: Set(now),
    }
}

/// Reconcile a single item: update it if its external id is known, insert it otherwise.
///
/// # Errors
/// Returns the store's error for the lookup or the write.
pub async fn reconcile_one<S: CardStore + ?Sized>(
    store: &S,
    item: &RemoteCardItem,
) -> Result<ReconciledCard, RepositoryError> {
    let model = to_active_model(item, Utc::now().fixed_offset());
    let external_id = present(item.id.as_ref()).unwrap_or_default();

    if external_id.is_empty() {
        return Err(RepositoryError::invalid("external_id is required"));
    }

    match store.find_by_external_id(&external_id).await? {
        Some(existing) => {
            let record = store.update_existing(&existing, model).await?;
            Ok(ReconciledCard {
                record,
                was_created: false,
            })
        }
        None => {
            let record = store.insert(model).await?;
            Ok(ReconciledCard {
                record,
                was_created: true,
            })
        }
    }
}

/// Reconcile every item in order and summarize the outcome.
///
/// Emits `ReconcileStarted`, one `ItemReconciled` per item, then
/// `ReconcileComplete`.
pub async fn reconcile<S: CardStore + ?Sized>(
    store: &S,
    items: &[RemoteCardItem],
    on_progress: Option<&ProgressSender>,
) -> SyncSummary {
    let mut summary = SyncSummary {
        total: items.len(),
        ..SyncSummary::default()
    };

    emit(
        on_progress,
        SyncProgress::ReconcileStarted { total: items.len() },
    );

    for item in items {
        let name = item.display_name();

        let outcome = match reconcile_one(store, item).await {
            Ok(ReconciledCard {
                was_created: true, ..
            }) => {
                summary.saved += 1;
                ItemOutcome::Created
            }
            Ok(ReconciledCard { record, .. }) => {
                tracing::trace!(external_id = %record.external_id, "Updated card");
                summary.updated += 1;
                ItemOutcome::Updated
            }
            Err(e) => {
                let external_id = item.id.clone().unwrap_or_default();
                tracing::warn!(external_id = %external_id, error = %e, "Failed to reconcile {}", name);
                summary.errors += 1;
                summary.error_details.push(ItemError {
                    name: name.clone(),
                    external_id,
                    message: e.to_string(),
                });
                ItemOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        emit(
            on_progress,
            SyncProgress::ItemReconciled {
                name,
                outcome,
                processed: summary.processed(),
                total: summary.total,
                saved: summary.saved,
                updated: summary.updated,
                errors: summary.errors,
            },
        );
    }

    emit(
        on_progress,
        SyncProgress::ReconcileComplete {
            saved: summary.saved,
            updated: summary.updated,
            errors: summary.errors,
        },
    );

    summary
}
