//! Catalog synchronization.
//!
//! # Module Structure
//!
//! - [`types`] - Results, options and constants
//! - [`progress`] - Progress channel: `SyncProgress`, `progress_channel()`, `emit()`
//! - [`reconcile`] - Item transform and sequential insert-or-overwrite
//! - [`engine`] - `CatalogSync` orchestration over a client and a store
//!
//! # Example
//!
//! ```ignore
//! use cardsync::sync::{CatalogSync, progress_channel};
//!
//! let sync = CatalogSync::new(client, Arc::new(db));
//! let result = sync.run_name_sync("Ember Drake", None).await;
//! assert!(result.success);
//! ```

pub mod engine;
mod progress;
pub mod reconcile;
mod types;

// Re-export types
pub use types::{
    DEFAULT_DELAY_MS, FullSyncOptions, FullSyncResult, ItemError, NameSyncResult, ReconciledCard,
    SyncSummary,
};

// Re-export progress types
pub use progress::{
    ItemOutcome, ProgressReceiver, ProgressSender, SyncProgress, emit, percent_complete,
    progress_channel,
};

pub use engine::{CatalogSync, run_dry_sync};
pub use reconcile::{reconcile, reconcile_one, to_active_model};
