//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cardsync::catalog::{CatalogClient, CatalogConfig};
use cardsync::connect_and_migrate;
use cardsync::http::{HttpError, HttpRequest, HttpResponse, HttpTransport};
use reqwest::Url;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

pub const BASE_URL: &str = "https://catalog.test/v1";

/// Maximum time any sync in these tests should take before we call it a hang.
pub const SYNC_TIMEOUT: Duration = Duration::from_secs(10);

/// Create an in-memory SQLite database with migrations applied.
pub async fn setup_test_db() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

/// A raw catalog item.
pub fn card(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "number": 1,
        "rarity": "Common",
        "type": "Creature",
        "effect": format!("{name} enters play."),
        "images": {"small": format!("https://img.test/{id}-s.png"), "large": format!("https://img.test/{id}-l.png")},
        "set": {"name": "First Light"},
        "energyCost": {"fire": 1},
        "artist": "R. Vale"
    })
}

/// `n` distinct items with ids `c-0 .. c-{n-1}`.
pub fn cards(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| card(&format!("c-{i}"), &format!("Card {i}")))
        .collect()
}

#[derive(Default)]
struct FakeCatalogState {
    cards: Vec<Value>,
    report_total: bool,
    /// Scripted statuses returned for a page before it is served normally.
    failures: HashMap<u32, VecDeque<u16>>,
    requests: Vec<String>,
}

/// Scripted in-memory catalog API.
///
/// Serves `GET /cards?page=&limit=&name=` slices of its card list and
/// `GET /cards?limit=1` probes. Name filtering is a case-insensitive
/// substring match.
#[derive(Clone)]
pub struct FakeCatalog {
    state: Arc<Mutex<FakeCatalogState>>,
}

impl FakeCatalog {
    pub fn new(cards: Vec<Value>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeCatalogState {
                cards,
                report_total: true,
                ..FakeCatalogState::default()
            })),
        }
    }

    /// Stop reporting `totalCount`.
    pub fn without_total(self) -> Self {
        self.state.lock().expect("lock").report_total = false;
        self
    }

    /// Fail requests for `page` with each of `statuses` in turn before serving it.
    pub fn fail_page(self, page: u32, statuses: &[u16]) -> Self {
        self.state
            .lock()
            .expect("lock")
            .failures
            .entry(page)
            .or_default()
            .extend(statuses.iter().copied());
        self
    }

    pub fn set_cards(&self, cards: Vec<Value>) {
        self.state.lock().expect("lock").cards = cards;
    }

    /// URLs requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().expect("lock").requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().expect("lock").requests.len()
    }

    /// Build a client against this catalog.
    pub fn client(&self, page_size: u32) -> CatalogClient {
        CatalogClient::new_with_transport(
            CatalogConfig::new(BASE_URL).with_page_size(page_size),
            Arc::new(self.clone()),
        )
        .expect("client should build")
    }
}

fn json_response(status: u16, body: Value) -> HttpResponse {
    HttpResponse {
        status,
        headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        body: body.to_string().into_bytes(),
    }
}

#[async_trait]
impl HttpTransport for FakeCatalog {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = Url::parse(&request.url).map_err(|e| HttpError::Transport(e.to_string()))?;
        let mut state = self.state.lock().expect("lock");
        state.requests.push(request.url.clone());

        if !url.path().ends_with("/cards") {
            return Ok(json_response(404, json!({"error": "not found"})));
        }

        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let limit: usize = params
            .get("limit")
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);
        let Some(page) = params.get("page").and_then(|v| v.parse::<u32>().ok()) else {
            return Ok(json_response(200, json!({"data": [], "totalCount": state.cards.len()})));
        };

        if let Some(status) = state.failures.get_mut(&page).and_then(|q| q.pop_front()) {
            return Ok(json_response(status, json!({"error": "scripted failure"})));
        }

        let needle = params.get("name").map(|n| n.to_lowercase());
        let matching: Vec<&Value> = state
            .cards
            .iter()
            .filter(|c| match &needle {
                Some(needle) => c["name"]
                    .as_str()
                    .is_some_and(|n| n.to_lowercase().contains(needle)),
                None => true,
            })
            .collect();

        let start = (page.saturating_sub(1) as usize) * limit;
        let data: Vec<Value> = matching.iter().skip(start).take(limit).map(|c| (*c).clone()).collect();

        let mut body = json!({"data": data});
        if state.report_total {
            body["totalCount"] = json!(matching.len());
        }
        Ok(json_response(200, body))
    }
}
