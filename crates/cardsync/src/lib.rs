//! Cardsync - mirror a remote card catalog into a local database.
//!
//! The library walks the catalog's paginated `/cards` listing, then
//! reconciles every item into a `cards` table keyed by the catalog's own
//! identifier: unknown ids are inserted, known ids are overwritten.
//!
//! # Features
//!
//! - `sqlite` (default) / `postgres` - database backends
//! - `migrate` (default) - schema migrations and [`connect_and_migrate`]
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cardsync::catalog::{CatalogClient, CatalogConfig};
//! use cardsync::sync::{CatalogSync, FullSyncOptions};
//!
//! let db = cardsync::connect_and_migrate("sqlite://cards.db?mode=rwc").await?;
//! let client = CatalogClient::new(CatalogConfig::new("https://api.example.com/v1"))?;
//! let sync = CatalogSync::new(client, Arc::new(db));
//!
//! let result = sync.run_full_sync(&FullSyncOptions::default(), None).await;
//! println!("saved {:?}", result.summary.map(|s| s.saved));
//! ```

pub mod catalog;
pub mod db;
pub mod entity;
pub mod http;
pub mod repository;
pub mod retry;
pub mod sync;

#[cfg(feature = "migrate")]
pub mod migration;

pub use catalog::{CatalogClient, CatalogConfig, FetchError, RemoteCardItem};
pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use repository::{CardStore, CatalogStats, RepositoryError};
pub use sync::{CatalogSync, FullSyncOptions, FullSyncResult, NameSyncResult, SyncSummary};
