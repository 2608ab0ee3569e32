//! Configuration module for Pantip-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; an empty file yields the site's real endpoints.
//!
//! # Example
//!
//! ```no_run
//! use pantip_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Search workers: {}", config.search.max_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CommentsConfig, Config, EndpointsConfig, HttpConfig, ProfileConfig, RendererKind,
    SearchConfig, DEFAULT_COMMENTS_ENDPOINT, DEFAULT_PROFILE_ENDPOINT, DEFAULT_SEARCH_ENDPOINT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_workers, MAX_WORKERS};
