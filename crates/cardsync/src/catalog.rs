//! Remote catalog access.
//!
//! - [`CatalogClient`] walks the paginated `/cards` listing
//! - [`RemoteCardItem`] is the leniently decoded raw item
//! - [`FetchError`] separates transient failures (429, 5xx) from fatal ones
//!
//! ```ignore
//! use cardsync::catalog::{CardFilter, CatalogClient, CatalogConfig};
//!
//! let client = CatalogClient::new(CatalogConfig::new("https://api.example.com/v1"))?;
//! let items = client
//!     .fetch_all(&CardFilter::all(), Duration::from_millis(100), None)
//!     .await?;
//! ```

mod client;
mod error;
mod types;

pub use client::{CatalogClient, CatalogConfig, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT};
pub use error::{FetchError, is_transient, short_error_message};
pub use types::{CardFilter, CardImages, CardPage, RemoteCardItem};
