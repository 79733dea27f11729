//! Catalog API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

use super::error::{FetchError, is_transient, short_error_message};
use super::types::{CardFilter, CardPage, RemoteCardItem};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::retry::{RetryConfig, with_retry};
use crate::sync::{ProgressSender, SyncProgress, emit, percent_complete};

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default per-request transport timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// API root, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub page_size: u32,
    /// Cap on transient retries of one page. `None` is unbounded.
    pub max_retries: Option<usize>,
}

impl CatalogConfig {
    /// Configuration with defaults for everything but the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
            max_retries: None,
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: Option<usize>) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Client for the paginated catalog listing.
#[derive(Clone)]
pub struct CatalogClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: Option<String>,
    page_size: u32,
    max_retries: Option<usize>,
}

impl CatalogClient {
    /// Create a client backed by reqwest.
    ///
    /// # Errors
    /// Returns `FetchError::Config` if the base URL is empty or the HTTP
    /// client cannot be built.
    pub fn new(config: CatalogConfig) -> Result<Self, FetchError> {
        let transport = ReqwestTransport::with_timeout(config.timeout)
            .map_err(|e| FetchError::Config(e.to_string()))?;
        Self::new_with_transport(config, Arc::new(transport))
    }

    /// Create a client over any transport.
    ///
    /// # Errors
    /// Returns `FetchError::Config` if the base URL is empty or the page size is zero.
    pub fn new_with_transport(
        config: CatalogConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, FetchError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(FetchError::Config("base_url is required".to_string()));
        }
        if config.page_size == 0 {
            return Err(FetchError::Config("page_size must be at least 1".to_string()));
        }

        Ok(Self {
            transport,
            base_url,
            api_key: config.api_key.filter(|k| !k.trim().is_empty()),
            page_size: config.page_size,
            max_retries: config.max_retries,
        })
    }

    /// Get the API root.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Build the listing URL for one page.
    pub(crate) fn page_url(&self, page: u32, filter: &CardFilter) -> Result<String, FetchError> {
        let mut params = vec![
            ("page", page.to_string()),
            ("limit", self.page_size.to_string()),
        ];
        if let Some(name) = &filter.name {
            params.push(("name", name.clone()));
        }
        self.cards_url(&params)
    }

    fn cards_url(&self, params: &[(&str, String)]) -> Result<String, FetchError> {
        Url::parse_with_params(&format!("{}/cards", self.base_url), params)
            .map(String::from)
            .map_err(|e| FetchError::Config(format!("invalid base_url {}: {}", self.base_url, e)))
    }

    /// Make an authenticated GET request.
    async fn get(&self, url: String) -> Result<HttpResponse, FetchError> {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), "cardsync".to_string()),
        ];
        if let Some(key) = &self.api_key {
            headers.push(("Authorization".to_string(), format!("Bearer {}", key)));
        }

        self.transport
            .send(HttpRequest { url, headers })
            .await
            .map_err(|e| FetchError::Http(e.to_string()))
    }

    /// Fetch a single page. No retry.
    ///
    /// # Errors
    /// Returns `FetchError::Api` for a non-2xx status, `FetchError::Json` for a
    /// body that is not a page, and `FetchError::Http` for transport failures.
    pub async fn fetch_page(&self, page: u32, filter: &CardFilter) -> Result<CardPage, FetchError> {
        let url = self.page_url(page, filter)?;
        let response = self.get(url).await?;

        if !response.is_success() {
            return Err(FetchError::Api {
                status: response.status,
                message: String::from_utf8_lossy(&response.body).to_string(),
            });
        }

        serde_json::from_slice(&response.body).map_err(FetchError::Json)
    }

    /// Walk the listing from page 1 and return every item.
    ///
    /// Stops at the first empty page, or once the number of fetched items
    /// reaches the `totalCount` reported by page 1. Sleeps `delay` between
    /// pages. Transient failures (429, 5xx) are retried after `delay * 2`.
    ///
    /// # Errors
    /// Returns the first non-transient error, or the last transient one once
    /// the retry cap is exhausted.
    pub async fn fetch_all(
        &self,
        filter: &CardFilter,
        delay: Duration,
        on_progress: Option<&ProgressSender>,
    ) -> Result<Vec<RemoteCardItem>, FetchError> {
        emit(
            on_progress,
            SyncProgress::FetchStarted {
                name: filter.name.clone(),
            },
        );

        let mut items: Vec<RemoteCardItem> = Vec::new();
        let mut total: Option<usize> = None;
        let mut page: u32 = 1;

        loop {
            let result = with_retry(
                || self.fetch_page(page, filter),
                RetryConfig::for_page_delay(delay, self.max_retries),
                is_transient,
                FetchError::status,
                short_error_message,
                page,
                on_progress,
            )
            .await?;

            if page == 1 {
                total = result.total_count;
            }

            let count = result.data.len();
            if count == 0 {
                tracing::debug!(page, "Empty page, listing exhausted");
                break;
            }

            items.extend(result.data);
            let fetched = items.len();
            tracing::debug!(page, count, fetched, total = ?total, "Fetched page");

            emit(
                on_progress,
                SyncProgress::FetchedPage {
                    page,
                    count,
                    fetched,
                    total,
                    percent: total.map(|t| percent_complete(fetched, t)),
                },
            );

            if let Some(total) = total
                && fetched >= total
            {
                break;
            }

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            page += 1;
        }

        emit(
            on_progress,
            SyncProgress::FetchComplete {
                fetched: items.len(),
            },
        );
        Ok(items)
    }

    /// Probe the catalog with a one-item request.
    ///
    /// Returns true only for a 200 response. Never errors.
    pub async fn test_connection(&self) -> bool {
        let url = match self.cards_url(&[("limit", "1".to_string())]) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(error = %e, "Cannot build probe URL");
                return false;
            }
        };

        match self.get(url).await {
            Ok(response) => {
                if response.status != 200 {
                    tracing::debug!(status = response.status, "Catalog probe failed");
                }
                response.status == 200
            }
            Err(e) => {
                tracing::debug!(error = %e, "Catalog probe failed");
                false
            }
        }
    }
}
