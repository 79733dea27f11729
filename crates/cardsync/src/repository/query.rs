use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect};
use serde::Serialize;

use crate::entity::card::{Column, Entity as Card, Model};

use super::errors::{RepositoryError, Result};

/// Number of cards sharing one value of a grouped column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCount {
    /// Column value, `None` for cards where it is absent.
    pub value: Option<String>,
    pub count: u64,
}

/// Aggregate view of the local catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_records: u64,
    pub by_rarity: Vec<FieldCount>,
    pub by_type: Vec<FieldCount>,
    pub by_set: Vec<FieldCount>,
}

// ─── Query Operations ────────────────────────────────────────────────────────

/// Count total cards.
pub async fn count<C: ConnectionTrait>(db: &C) -> Result<u64> {
    Card::find().count(db).await.map_err(RepositoryError::from)
}

/// Find all cards ordered by name.
pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>> {
    Card::find()
        .order_by_asc(Column::Name)
        .order_by_asc(Column::ExternalId)
        .all(db)
        .await
        .map_err(RepositoryError::from)
}

/// Count cards grouped by the values of one column.
///
/// Ordered by descending count, then by value with absent values last.
pub async fn group_counts<C: ConnectionTrait>(db: &C, column: Column) -> Result<Vec<FieldCount>> {
    let rows = Card::find()
        .select_only()
        .column(column)
        .column_as(Expr::col(Column::Id).count(), "count")
        .group_by(column)
        .into_tuple::<(Option<String>, i64)>()
        .all(db)
        .await
        .map_err(RepositoryError::from)?;

    let mut counts: Vec<FieldCount> = rows
        .into_iter()
        .map(|(value, count)| FieldCount {
            value,
            count: u64::try_from(count).unwrap_or_default(),
        })
        .collect();
    sort_counts(&mut counts);
    Ok(counts)
}

/// Gather totals and the rarity, type and set breakdowns.
pub async fn stats<C: ConnectionTrait>(db: &C) -> Result<CatalogStats> {
    Ok(CatalogStats {
        total_records: count(db).await?,
        by_rarity: group_counts(db, Column::Rarity).await?,
        by_type: group_counts(db, Column::CardType).await?,
        by_set: group_counts(db, Column::SetName).await?,
    })
}

fn sort_counts(counts: &mut [FieldCount]) {
    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| match (&a.value, &b.value) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
    });
}
