//! Sync orchestration.
//!
//! [`CatalogSync`] ties the catalog client to a card store. Its entry points
//! never return an error: fetch and store failures are reported through the
//! `success` flag and `error` message of the result.
//!
//! # Example
//!
//! ```ignore
//! use cardsync::sync::{CatalogSync, FullSyncOptions, progress_channel};
//!
//! let sync = CatalogSync::new(client, Arc::new(db));
//! let (tx, rx) = progress_channel();
//! let result = sync.run_full_sync(&FullSyncOptions::default(), Some(&tx)).await;
//! println!("fetched {}", result.items_fetched);
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::progress::{ProgressSender, SyncProgress, emit};
use super::reconcile::reconcile;
use super::types::{DEFAULT_DELAY_MS, FullSyncOptions, FullSyncResult, NameSyncResult};
use crate::catalog::{CardFilter, CatalogClient, RemoteCardItem};
use crate::repository::{CardStore, CatalogStats, RepositoryError};

/// Catalog-to-store synchronization.
pub struct CatalogSync<S: CardStore> {
    client: CatalogClient,
    store: Arc<S>,
    default_delay: Duration,
}

impl<S: CardStore> CatalogSync<S> {
    /// Create a sync over `client` and `store` with the default page delay.
    pub fn new(client: CatalogClient, store: Arc<S>) -> Self {
        Self {
            client,
            store,
            default_delay: Duration::from_millis(DEFAULT_DELAY_MS),
        }
    }

    /// Set the page delay used by name-filtered syncs.
    #[must_use]
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Fetch the whole catalog (or the cards matching `options.name`) and
    /// reconcile it into the store.
    ///
    /// With `dry_run` set, the store is never touched and only the fetched
    /// count is reported.
    #[tracing::instrument(skip(self, options, on_progress), fields(name = ?options.name, dry_run = options.dry_run))]
    pub async fn run_full_sync(
        &self,
        options: &FullSyncOptions,
        on_progress: Option<&ProgressSender>,
    ) -> FullSyncResult {
        if options.dry_run {
            return run_dry_sync(&self.client, options, on_progress).await;
        }

        let started = Instant::now();
        tracing::info!("Starting catalog sync");

        let items = match fetch_items(&self.client, options, on_progress).await {
            Ok(items) => items,
            Err(failed) => return failed,
        };

        let summary = reconcile(self.store.as_ref(), &items, on_progress).await;
        tracing::info!(
            fetched = items.len(),
            saved = summary.saved,
            updated = summary.updated,
            errors = summary.errors,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Catalog sync complete"
        );

        FullSyncResult {
            success: true,
            dry_run: false,
            items_fetched: items.len(),
            summary: Some(summary),
            error: None,
        }
    }

    /// Fetch the cards matching `name` and reconcile them.
    ///
    /// No match is a successful run with an empty summary.
    #[tracing::instrument(skip(self, on_progress))]
    pub async fn run_name_sync(
        &self,
        name: &str,
        on_progress: Option<&ProgressSender>,
    ) -> NameSyncResult {
        let started = Instant::now();
        tracing::info!("Starting name sync");

        let filter = CardFilter::by_name(name);
        let items = match self
            .client
            .fetch_all(&filter, self.default_delay, on_progress)
            .await
        {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(error = %e, "Name sync failed while fetching");
                return NameSyncResult {
                    success: false,
                    error: Some(e.to_string()),
                    ..NameSyncResult::default()
                };
            }
        };

        let summary = reconcile(self.store.as_ref(), &items, on_progress).await;
        tracing::info!(
            fetched = items.len(),
            saved = summary.saved,
            updated = summary.updated,
            errors = summary.errors,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Name sync complete"
        );

        NameSyncResult {
            success: true,
            items_fetched: items.len(),
            summary: Some(summary),
            error: None,
        }
    }

    /// Totals and breakdowns of what is stored locally.
    ///
    /// # Errors
    /// Returns the store's error.
    pub async fn get_stats(&self) -> Result<CatalogStats, RepositoryError> {
        self.store.stats().await
    }

    /// Probe the remote catalog.
    pub async fn test_connection(&self) -> bool {
        self.client.test_connection().await
    }
}

/// Fetch the catalog and report only how many cards it holds.
///
/// Needs no store, so callers can count the catalog without opening a
/// database. Emits `DryRunComplete` after a successful fetch.
#[tracing::instrument(skip(client, options, on_progress), fields(name = ?options.name))]
pub async fn run_dry_sync(
    client: &CatalogClient,
    options: &FullSyncOptions,
    on_progress: Option<&ProgressSender>,
) -> FullSyncResult {
    let started = Instant::now();
    tracing::info!("Starting catalog dry run");

    let items = match fetch_items(client, options, on_progress).await {
        Ok(items) => items,
        Err(mut failed) => {
            failed.dry_run = true;
            return failed;
        }
    };

    emit(
        on_progress,
        SyncProgress::DryRunComplete {
            fetched: items.len(),
        },
    );
    tracing::info!(
        fetched = items.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Dry run complete"
    );
    FullSyncResult {
        success: true,
        dry_run: true,
        items_fetched: items.len(),
        summary: None,
        error: None,
    }
}

/// Fetch every item for `options`, turning a fetch error into a failed result.
async fn fetch_items(
    client: &CatalogClient,
    options: &FullSyncOptions,
    on_progress: Option<&ProgressSender>,
) -> Result<Vec<RemoteCardItem>, FullSyncResult> {
    let filter = CardFilter {
        name: options.name.clone(),
    };

    client
        .fetch_all(&filter, options.delay, on_progress)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Catalog sync failed while fetching");
            FullSyncResult {
                success: false,
                dry_run: options.dry_run,
                error: Some(e.to_string()),
                ..FullSyncResult::default()
            }
        })
}
