//! Pantip-Harvest: topic, comment, search and profile retrieval for pantip.com
//!
//! This crate talks to the forum's undocumented endpoints: the comment-render
//! JSON endpoint, the search service API and the HTML profile pages. Each
//! fetcher is independent; batch fetchers are best-effort and never fail the
//! whole run because one request did.

pub mod client;
pub mod comments;
pub mod config;
pub mod index;
pub mod profile;
pub mod progress;
pub mod search;

use thiserror::Error;

/// Main error type for Pantip-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Failure of a single request against one of the site's endpoints
///
/// Batch fetchers catch these per id or per page and log them; only the
/// profile fetcher hands them back to the caller.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Render service failed for {url}: {message}")]
    Render { url: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Pantip-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use comments::{CommentFetcher, CommentResult, KeywordCommentMap};
pub use config::Config;
pub use index::{extract_keyword_ids, KeywordIdIndex, TopicId};
pub use profile::{ProfileFetcher, UserProfile};
pub use search::{SearchFetcher, SearchPageResult};
