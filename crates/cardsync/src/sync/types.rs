//! Shared sync types and constants.

use std::time::Duration;

use serde::Serialize;

use crate::entity::card;

/// Default pause between page requests, in milliseconds.
pub const DEFAULT_DELAY_MS: u64 = 100;

/// Failure record for a single item that could not be reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemError {
    /// Display name of the item (falls back to its id).
    pub name: String,
    /// External identifier, empty when the remote item had none.
    pub external_id: String,
    /// Failure message.
    pub message: String,
}

/// Result of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    /// Number of items offered to the run.
    pub total: usize,
    /// Number of records created.
    pub saved: usize,
    /// Number of existing records overwritten.
    pub updated: usize,
    /// Number of items that failed.
    pub errors: usize,
    /// Per-item failures, in the order they happened.
    pub error_details: Vec<ItemError>,
}

impl SyncSummary {
    /// Items processed so far (created, updated, or failed).
    #[must_use]
    pub fn processed(&self) -> usize {
        self.saved + self.updated + self.errors
    }

    /// Whether any item failed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// A single reconciled record.
#[derive(Debug, Clone)]
pub struct ReconciledCard {
    /// The persisted record after the write.
    pub record: card::Model,
    /// True when the record was inserted, false when an existing one was updated.
    pub was_created: bool,
}

/// Options for a full catalog sync.
#[derive(Debug, Clone)]
pub struct FullSyncOptions {
    /// Restrict the fetch to cards matching this name.
    pub name: Option<String>,
    /// Pause between page requests. Transient failures wait twice this long.
    pub delay: Duration,
    /// Fetch and count only; never touch the store.
    pub dry_run: bool,
}

impl Default for FullSyncOptions {
    fn default() -> Self {
        Self {
            name: None,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            dry_run: false,
        }
    }
}

/// Result of a full catalog sync.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
#[must_use = "FullSyncResult carries the success flag and per-item errors"]
pub struct FullSyncResult {
    pub success: bool,
    pub dry_run: bool,
    pub items_fetched: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SyncSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a name-filtered sync.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
#[must_use = "NameSyncResult carries the success flag and per-item errors"]
pub struct NameSyncResult {
    pub success: bool,
    pub items_fetched: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SyncSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
