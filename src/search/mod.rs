//! Paged search retrieval
//!
//! This module queries the search service for pages `0..=page_count` of one
//! keyword on a bounded worker pool, records the total result count from
//! page 1, and stops examining completions once a page comes back with an
//! empty `data` list.

mod result;

pub use result::{result_set, SearchPageResult};

use crate::client::{build_http_client, search_headers};
use crate::config::{Config, MAX_WORKERS};
use crate::progress::{NoProgress, ProgressSink};
use crate::FetchError;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// JSON body of a search request
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
    pub keyword: &'a str,
    pub page: u32,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub show_btn_search: &'static str,
    pub room_search: Option<String>,
}

impl<'a> SearchRequest<'a> {
    pub fn new(keyword: &'a str, page: u32) -> Self {
        Self {
            keyword,
            page,
            kind: "all",
            show_btn_search: "true",
            room_search: None,
        }
    }
}

/// Fetches every search page of one keyword
#[derive(Clone)]
pub struct SearchFetcher {
    client: Client,
    endpoint: String,
    headers: HeaderMap,
    keyword: String,
    page_count: u32,
    max_workers: usize,
    throttle: Duration,
    progress: Arc<dyn ProgressSink>,
}

impl SearchFetcher {
    /// Creates a fetcher for pages `0..=page_count` of `keyword`
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        headers: HeaderMap,
        keyword: impl Into<String>,
        page_count: u32,
        max_workers: usize,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            headers,
            keyword: keyword.into(),
            page_count,
            max_workers,
            throttle: Duration::from_millis(100),
            progress: Arc::new(NoProgress),
        }
    }

    /// Creates a fetcher from configuration, building its own client
    pub fn from_config(config: &Config, keyword: impl Into<String>) -> crate::Result<Self> {
        let client = build_http_client(&config.http)?;
        let headers = search_headers(&config.http.search_user_agent)?;
        Ok(Self::new(
            client,
            config.endpoints.search.clone(),
            headers,
            keyword,
            config.search.page_count,
            config.search.max_workers,
        )
        .with_throttle(Duration::from_millis(config.search.throttle_ms)))
    }

    /// Sets the delay applied after each examined completion
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Replaces the progress sink
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Requests one page and decodes it
    pub async fn request_page(&self, page: u32) -> Result<Value, FetchError> {
        let url = &self.endpoint;

        let response = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .json(&SearchRequest::new(&self.keyword, page))
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::HttpStatus {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Network {
                url: url.clone(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
            url: url.clone(),
            message: e.to_string(),
        })
    }

    /// Fetches one page, turning any failure into `None`
    pub async fn fetch_page(&self, page: u32) -> (u32, Option<Value>) {
        match self.request_page(page).await {
            Ok(data) => (page, Some(data)),
            Err(e) => {
                tracing::warn!("Search page {} for '{}' failed: {}", page, self.keyword, e);
                (page, None)
            }
        }
    }

    /// Fetches all pages and assembles the result
    ///
    /// Every page is submitted up front to a pool of `max_workers` workers,
    /// clamped to `1..=MAX_WORKERS`. Once a completed page has an empty
    /// `data` list, the collector stops examining completions and raises a
    /// stop flag; units still waiting for a worker see the flag and skip
    /// their request, while requests already in flight finish unobserved.
    /// A stopped run therefore sends fewer than `page_count + 1` requests.
    pub async fn fetch_all(&self) -> SearchPageResult {
        let stop = Arc::new(AtomicBool::new(false));
        let semaphore = Arc::new(Semaphore::new(self.max_workers.clamp(1, MAX_WORKERS)));
        let mut join_set = JoinSet::new();

        for page in 0..=self.page_count {
            let fetcher = self.clone();
            let stop = Arc::clone(&stop);
            let semaphore = Arc::clone(&semaphore);

            join_set.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (page, None);
                };
                if stop.load(Ordering::Acquire) {
                    tracing::debug!("Skipping page {} after stop", page);
                    return (page, None);
                }
                fetcher.fetch_page(page).await
            });
        }

        let total_units = u64::from(self.page_count) + 1;
        tracing::info!(
            "Submitted {} search pages for '{}'",
            total_units,
            self.keyword
        );
        self.progress.start(&self.keyword, total_units);

        let mut pages = BTreeMap::new();
        let mut total_results = None;

        while let Some(joined) = join_set.join_next().await {
            self.progress.advance();

            match joined {
                Ok((page, Some(data))) if is_truthy(&data) => {
                    tracing::debug!("Page {} processed successfully", page);

                    if page == 1 {
                        if let Some(total) = data.get("total") {
                            tracing::info!("Total results for '{}': {}", self.keyword, total);
                            total_results = Some(total.clone());
                        }
                    }

                    let exhausted = data.get("data").is_some_and(|d| !is_truthy(d));
                    pages.insert(page, data);

                    if exhausted {
                        tracing::info!("Page {} has no data, stopping", page);
                        stop.store(true, Ordering::Release);
                        break;
                    }
                }
                Ok((page, _)) => {
                    tracing::warn!("Failed to process page {}", page);
                }
                Err(e) => {
                    tracing::warn!("Search page task failed: {}", e);
                }
            }

            tokio::time::sleep(self.throttle).await;
        }

        // Leave in-flight requests running; their results are not examined.
        join_set.detach_all();
        self.progress.finish();

        SearchPageResult {
            search_keyword: self.keyword.clone(),
            total_results,
            pages,
        }
    }
}

/// Whether a decoded value carries anything
///
/// `null`, `false`, zero, and empty strings, arrays and objects count as empty.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
