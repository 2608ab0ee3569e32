//! Batched comment retrieval
//!
//! This module fetches the comments of every topic in a keyword index:
//! - Splits each keyword's id list into fixed-size batches
//! - Runs batches concurrently on a bounded worker pool
//! - Fetches ids sequentially inside a batch, skipping failures
//! - Merges batch results per keyword in completion order

mod batch;

pub use batch::{plan_batches, CommentBatch, BATCH_SIZE};

use crate::client::{build_http_client, comment_headers};
use crate::config::{Config, MAX_WORKERS};
use crate::index::{KeywordIdIndex, TopicId};
use crate::progress::{NoProgress, ProgressSink};
use crate::FetchError;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Decoded comment payload per topic id; ids that failed are absent
///
/// Keys follow [`TopicId`] ordering (textual), not request order.
pub type CommentResult = BTreeMap<TopicId, Value>;

/// Comment results per search keyword
pub type KeywordCommentMap = BTreeMap<String, CommentResult>;

/// Fetches topic comments from the comment-render endpoint
#[derive(Clone)]
pub struct CommentFetcher {
    client: Client,
    endpoint: String,
    headers: HeaderMap,
    progress: Arc<dyn ProgressSink>,
}

impl CommentFetcher {
    /// Creates a fetcher for the given endpoint
    pub fn new(client: Client, endpoint: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            headers,
            progress: Arc::new(NoProgress),
        }
    }

    /// Creates a fetcher from configuration, building its own client
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let client = build_http_client(&config.http)?;
        let headers = comment_headers(&config.http.comment_user_agent)?;
        Ok(Self::new(client, config.endpoints.comments.clone(), headers))
    }

    /// Replaces the progress sink
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Fetches and decodes the comments of a single topic
    ///
    /// Only status 200 counts as success.
    pub async fn fetch_topic(&self, id: &TopicId) -> Result<Value, FetchError> {
        let url = &self.endpoint;

        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .query(&[("tid", id.as_str()), ("type", "3")])
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

    /// Fetches comments for a batch of ids, one after another
    ///
    /// A failed id is logged and left out; the rest of the batch continues.
    pub async fn fetch_comments(&self, keyword: &str, ids: &[TopicId]) -> (String, CommentResult) {
        let mut comments = CommentResult::new();

        for id in ids {
            match self.fetch_topic(id).await {
                Ok(data) => {
                    comments.insert(id.clone(), data);
                }
                Err(e) => {
                    tracing::warn!("Skipping topic {} for '{}': {}", id, keyword, e);
                }
            }
        }

        (keyword.to_string(), comments)
    }

    /// Fetches comments for every id in the index
    ///
    /// Each batch of [`BATCH_SIZE`] ids is one unit on a pool of
    /// `max_workers` concurrent workers, clamped to `1..=MAX_WORKERS`.
    /// Results are merged as batches complete; a keyword whose batches all
    /// came back empty is absent.
    pub async fn fetch_all(&self, index: &KeywordIdIndex, max_workers: usize) -> KeywordCommentMap {
        let batches = plan_batches(index, BATCH_SIZE);
        let total = batches.len();

        let semaphore = Arc::new(Semaphore::new(max_workers.clamp(1, MAX_WORKERS)));
        let mut join_set = JoinSet::new();

        for batch in batches {
            let fetcher = self.clone();
            let semaphore = Arc::clone(&semaphore);

            join_set.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (batch.keyword, CommentResult::new());
                };
                fetcher.fetch_comments(&batch.keyword, &batch.ids).await
            });
        }

        tracing::info!("Submitted {} comment batches", total);
        self.progress.start("comments", total as u64);

        let mut results = KeywordCommentMap::new();
        while let Some(joined) = join_set.join_next().await {
            self.progress.advance();

            match joined {
                Ok((keyword, comments)) => {
                    if !comments.is_empty() {
                        merge_comments(&mut results, keyword, comments);
                    }
                }
                Err(e) => {
                    tracing::warn!("Comment batch task failed: {}", e);
                }
            }
        }

        self.progress.finish();
        results
    }
}

/// Merges one batch into the keyword map; colliding ids are overwritten
pub fn merge_comments(results: &mut KeywordCommentMap, keyword: String, comments: CommentResult) {
    results.entry(keyword).or_default().extend(comments);
}
