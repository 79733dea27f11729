//! Integration tests for catalog sync against a scripted catalog and an
//! in-memory SQLite store.
//!
//! Key scenarios tested:
//! - Pagination issues exactly `ceil(N/P)` requests and returns every item
//! - Re-running a sync updates in place instead of duplicating
//! - One invalid item does not stop the rest
//! - Dry runs leave the store untouched
//! - Transient failures back off by twice the page delay

#![cfg(all(feature = "sqlite", feature = "migrate"))]

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use cardsync::CardStore;
use cardsync::entity::card::Entity as Card;
use cardsync::sync::{CatalogSync, FullSyncOptions, SyncProgress, progress_channel};
use sea_orm::EntityTrait;
use serde_json::json;
use tokio::time::timeout;

use common::{FakeCatalog, SYNC_TIMEOUT, card, cards, setup_test_db};

fn options(delay: Duration) -> FullSyncOptions {
    FullSyncOptions {
        delay,
        ..FullSyncOptions::default()
    }
}

#[tokio::test]
async fn test_pagination_requests_ceil_n_over_p_pages() {
    for (n, p) in [(1usize, 10u32), (10, 10), (11, 10), (25, 4), (7, 1)] {
        let catalog = FakeCatalog::new(cards(n));
        let items = catalog
            .client(p)
            .fetch_all(&Default::default(), Duration::ZERO, None)
            .await
            .expect("fetch should succeed");

        assert_eq!(items.len(), n, "items for n={n} p={p}");
        assert_eq!(
            catalog.request_count(),
            n.div_ceil(p as usize),
            "requests for n={n} p={p}"
        );
    }
}

#[tokio::test]
async fn test_empty_catalog_issues_one_request() {
    let catalog = FakeCatalog::new(Vec::new());
    let db = Arc::new(setup_test_db().await);
    let sync = CatalogSync::new(catalog.client(10), Arc::clone(&db));

    let result = sync.run_full_sync(&options(Duration::ZERO), None).await;

    assert!(result.success);
    assert_eq!(result.items_fetched, 0);
    assert_eq!(catalog.request_count(), 1);
    assert_eq!(db.count().await.expect("count"), 0);
}

#[tokio::test]
async fn test_pagination_without_total_stops_at_empty_page() {
    let catalog = FakeCatalog::new(cards(5)).without_total();
    let items = catalog
        .client(2)
        .fetch_all(&Default::default(), Duration::ZERO, None)
        .await
        .expect("fetch should succeed");

    assert_eq!(items.len(), 5);
    // Pages 1..=3 carry items, page 4 is the empty terminator.
    assert_eq!(catalog.request_count(), 4);
}

#[tokio::test]
async fn test_full_sync_persists_every_field() {
    let catalog = FakeCatalog::new(vec![card("fl-1", "Ember Drake")]);
    let db = Arc::new(setup_test_db().await);
    let sync = CatalogSync::new(catalog.client(10), Arc::clone(&db));

    let result = timeout(SYNC_TIMEOUT, sync.run_full_sync(&options(Duration::ZERO), None))
        .await
        .expect("sync should not hang");
    assert!(result.success);

    let stored = db
        .find_by_external_id("fl-1")
        .await
        .expect("lookup")
        .expect("card should be stored");
    assert_eq!(stored.name, "Ember Drake");
    assert_eq!(stored.number.as_deref(), Some("1"));
    assert_eq!(stored.set_name.as_deref(), Some("First Light"));
    assert_eq!(stored.description.as_deref(), Some("Ember Drake enters play."));
    assert_eq!(stored.image_url.as_deref(), Some("https://img.test/fl-1-l.png"));
    assert_eq!(stored.energy_cost, Some(json!({"fire": 1})));
    assert_eq!(stored.metadata, json!({"artist": "R. Vale"}));
}

#[tokio::test]
async fn test_second_identical_run_updates_in_place() {
    let catalog = FakeCatalog::new(cards(12));
    let db = Arc::new(setup_test_db().await);
    let sync = CatalogSync::new(catalog.client(5), Arc::clone(&db));

    let first = sync.run_full_sync(&options(Duration::ZERO), None).await;
    let first_summary = first.summary.expect("summary");
    assert_eq!(first_summary.saved, 12);
    assert_eq!(first_summary.updated, 0);

    let ids_before: BTreeSet<_> = Card::find()
        .all(db.as_ref())
        .await
        .expect("list")
        .into_iter()
        .map(|c| c.id)
        .collect();

    let second = sync.run_full_sync(&options(Duration::ZERO), None).await;
    let second_summary = second.summary.expect("summary");
    assert_eq!(second_summary.saved, 0);
    assert_eq!(second_summary.updated, 12);
    assert_eq!(second_summary.errors, 0);

    let ids_after: BTreeSet<_> = Card::find()
        .all(db.as_ref())
        .await
        .expect("list")
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids_before, ids_after);
}

#[tokio::test]
async fn test_changed_item_is_fully_overwritten() {
    let catalog = FakeCatalog::new(vec![card("fl-1", "Ember Drake")]);
    let db = Arc::new(setup_test_db().await);
    let sync = CatalogSync::new(catalog.client(10), Arc::clone(&db));
    let _ = sync.run_full_sync(&options(Duration::ZERO), None).await;

    catalog.set_cards(vec![json!({"id": "fl-1", "name": "Ember Drake, Reborn"})]);
    let result = sync.run_full_sync(&options(Duration::ZERO), None).await;
    assert_eq!(result.summary.expect("summary").updated, 1);

    let stored = db
        .find_by_external_id("fl-1")
        .await
        .expect("lookup")
        .expect("card");
    assert_eq!(stored.name, "Ember Drake, Reborn");
    assert!(stored.rarity.is_none());
    assert!(stored.description.is_none());
    assert!(stored.energy_cost.is_none());
    assert_eq!(stored.metadata, json!({}));
}

#[tokio::test]
async fn test_duplicate_ids_in_one_run_keep_later_values() {
    let catalog = FakeCatalog::new(vec![card("dup", "First"), card("dup", "Second")]);
    let db = Arc::new(setup_test_db().await);
    let sync = CatalogSync::new(catalog.client(10), Arc::clone(&db));

    let summary = sync
        .run_full_sync(&options(Duration::ZERO), None)
        .await
        .summary
        .expect("summary");

    assert_eq!(summary.saved, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(db.count().await.expect("count"), 1);
    let stored = db.find_by_external_id("dup").await.expect("lookup").expect("card");
    assert_eq!(stored.name, "Second");
}

#[tokio::test]
async fn test_invalid_item_is_isolated() {
    let mut items = cards(4);
    items.insert(2, json!({"id": "bad", "name": "x".repeat(201)}));
    let catalog = FakeCatalog::new(items);
    let db = Arc::new(setup_test_db().await);
    let sync = CatalogSync::new(catalog.client(10), Arc::clone(&db));

    let result = sync.run_full_sync(&options(Duration::ZERO), None).await;

    assert!(result.success);
    let summary = result.summary.expect("summary");
    assert_eq!(summary.total, 5);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.saved + summary.updated, 4);
    assert_eq!(summary.processed(), 5);
    assert_eq!(summary.error_details[0].external_id, "bad");
    assert_eq!(db.count().await.expect("count"), 4);
}

#[tokio::test]
async fn test_dry_run_leaves_store_untouched() {
    let catalog = FakeCatalog::new(cards(7));
    let db = Arc::new(setup_test_db().await);
    let sync = CatalogSync::new(catalog.client(3), Arc::clone(&db));

    let result = sync
        .run_full_sync(
            &FullSyncOptions {
                delay: Duration::ZERO,
                dry_run: true,
                ..FullSyncOptions::default()
            },
            None,
        )
        .await;

    assert!(result.success);
    assert!(result.dry_run);
    assert_eq!(result.items_fetched, 7);
    assert!(result.summary.is_none());
    assert_eq!(db.count().await.expect("count"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_back_off_by_twice_the_delay() {
    let catalog = FakeCatalog::new(cards(3)).fail_page(1, &[503, 503]);
    let client = catalog.client(10);

    let (tx, mut rx) = progress_channel();
    let started = tokio::time::Instant::now();
    let items = client
        .fetch_all(&Default::default(), Duration::from_millis(250), Some(&tx))
        .await
        .expect("fetch should succeed after retries");

    assert_eq!(items.len(), 3);
    assert_eq!(catalog.request_count(), 3);
    // Two waits of 2 * 250ms, no inter-page sleep after the terminal page.
    assert_eq!(started.elapsed(), Duration::from_millis(1000));

    let mut retries = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let SyncProgress::PageRetry {
            page,
            status,
            retry_after_ms,
            attempt,
        } = event
        {
            retries.push((page, status, retry_after_ms, attempt));
        }
    }
    assert_eq!(
        retries,
        vec![(1, Some(503), 500, 1), (1, Some(503), 500, 2)]
    );
}

#[tokio::test]
async fn test_full_sync_recovers_from_transient_failures() {
    let catalog = FakeCatalog::new(cards(4)).fail_page(2, &[429, 502]);
    let db = Arc::new(setup_test_db().await);
    let sync = CatalogSync::new(catalog.client(2), Arc::clone(&db));

    let result = timeout(
        SYNC_TIMEOUT,
        sync.run_full_sync(&options(Duration::from_millis(5)), None),
    )
    .await
    .expect("sync should not hang");

    assert!(result.success);
    assert_eq!(result.items_fetched, 4);
    assert_eq!(catalog.request_count(), 4);
    assert_eq!(db.count().await.expect("count"), 4);
}

#[tokio::test]
async fn test_fatal_status_aborts_without_writing() {
    let catalog = FakeCatalog::new(cards(4)).fail_page(2, &[404]);
    let db = Arc::new(setup_test_db().await);
    let sync = CatalogSync::new(catalog.client(2), Arc::clone(&db));

    let result = sync.run_full_sync(&options(Duration::ZERO), None).await;

    assert!(!result.success);
    assert!(result.error.expect("error").contains("404"));
    assert_eq!(catalog.request_count(), 2);
    assert_eq!(db.count().await.expect("count"), 0);
}

#[tokio::test]
async fn test_name_sync_filters_and_reconciles() {
    let catalog = FakeCatalog::new(vec![
        card("a", "Ember Drake"),
        card("b", "Tide Caller"),
        card("c", "Ember Whelp"),
    ]);
    let db = Arc::new(setup_test_db().await);
    let sync = CatalogSync::new(catalog.client(10), Arc::clone(&db))
        .with_default_delay(Duration::ZERO);

    let result = sync.run_name_sync("ember", None).await;

    assert!(result.success);
    assert_eq!(result.items_fetched, 2);
    assert_eq!(result.summary.expect("summary").saved, 2);
    assert!(catalog.requests()[0].contains("name=ember"));
    assert!(db.find_by_external_id("b").await.expect("lookup").is_none());
}

#[tokio::test]
async fn test_name_sync_without_match_succeeds() {
    let catalog = FakeCatalog::new(cards(3));
    let db = Arc::new(setup_test_db().await);
    let sync = CatalogSync::new(catalog.client(10), Arc::clone(&db))
        .with_default_delay(Duration::ZERO);

    let result = sync.run_name_sync("no such card", None).await;

    assert!(result.success);
    assert_eq!(result.items_fetched, 0);
    assert_eq!(result.summary.expect("summary").total, 0);
    assert_eq!(db.count().await.expect("count"), 0);
}

#[tokio::test]
async fn test_get_stats_after_sync() {
    let mut items = cards(3);
    items.push(json!({"id": "r-1", "name": "Rare One", "rarity": "Rare", "set": "Dusk"}));
    let catalog = FakeCatalog::new(items);
    let db = Arc::new(setup_test_db().await);
    let sync = CatalogSync::new(catalog.client(10), Arc::clone(&db));
    let _ = sync.run_full_sync(&options(Duration::ZERO), None).await;

    let stats = sync.get_stats().await.expect("stats");

    assert_eq!(stats.total_records, 4);
    assert_eq!(stats.by_rarity[0].value.as_deref(), Some("Common"));
    assert_eq!(stats.by_rarity[0].count, 3);
    assert_eq!(stats.by_type.len(), 2);
    assert_eq!(stats.by_set[0].value.as_deref(), Some("First Light"));
}

#[tokio::test]
async fn test_connection_probe() {
    let catalog = FakeCatalog::new(cards(1));
    let db = Arc::new(setup_test_db().await);
    let sync = CatalogSync::new(catalog.client(10), db);

    assert!(sync.test_connection().await);
    assert_eq!(catalog.requests(), vec!["https://catalog.test/v1/cards?limit=1"]);
}
