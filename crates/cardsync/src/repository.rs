//! Card persistence.
//!
//! Free functions over any sea-orm connection, plus the [`CardStore`] trait
//! that the sync pipeline is written against.

mod errors;
mod query;
mod single;
mod store;
mod validate;

pub use errors::{RepositoryError, Result};
pub use query::{CatalogStats, FieldCount, count, find_all, group_counts, stats};
pub use single::{
    find_by_external_id, find_by_id, insert, update_by_external_id, update_existing,
};
pub use store::CardStore;
pub use validate::{
    MAX_CARD_TYPE_LEN, MAX_EXTERNAL_ID_LEN, MAX_NAME_LEN, MAX_NUMBER_LEN, MAX_RARITY_LEN,
    MAX_SET_NAME_LEN, validate_card,
};
