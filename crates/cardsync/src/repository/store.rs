use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::entity::card::{ActiveModel, Model};

use super::errors::Result;
use super::query::{self, CatalogStats};
use super::single;

/// Persistence collaborator used by the reconciler and orchestration.
///
/// Every method is a point operation. Implementations validate records on
/// write and report violations as `RepositoryError::InvalidInput`.
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Model>>;

    async fn insert(&self, model: ActiveModel) -> Result<Model>;

    /// Overwrite the record stored under `external_id`.
    async fn update_by_external_id(&self, external_id: &str, model: ActiveModel) -> Result<Model>;

    /// Overwrite a record the caller has already looked up.
    ///
    /// Defaults to [`CardStore::update_by_external_id`]; stores that can
    /// write by primary key override it to skip the second lookup.
    async fn update_existing(&self, existing: &Model, model: ActiveModel) -> Result<Model> {
        self.update_by_external_id(&existing.external_id, model).await
    }

    async fn count(&self) -> Result<u64>;

    async fn stats(&self) -> Result<CatalogStats>;
}

#[async_trait]
impl CardStore for DatabaseConnection {
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Model>> {
        single::find_by_external_id(self, external_id).await
    }

    async fn insert(&self, model: ActiveModel) -> Result<Model> {
        single::insert(self, model).await
    }

    async fn update_by_external_id(&self, external_id: &str, model: ActiveModel) -> Result<Model> {
        single::update_by_external_id(self, external_id, model).await
    }

    async fn update_existing(&self, existing: &Model, model: ActiveModel) -> Result<Model> {
        single::update_existing(self, existing, model).await
    }

    async fn count(&self) -> Result<u64> {
        query::count(self).await
    }

    async fn stats(&self) -> Result<CatalogStats> {
        query::stats(self).await
    }
}
