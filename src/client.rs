//! HTTP client construction
//!
//! This module builds the shared `reqwest` client and the fixed header
//! bundles each endpoint expects:
//! - comment-render endpoint: browser user agent + XHR marker
//! - search service: the full header set a browser sends from the search page

use crate::config::HttpConfig;
use crate::ConfigError;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, ORIGIN, REFERER,
    USER_AGENT,
};
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// No timeout is applied unless `timeout_secs` is set.
///
/// # Example
///
/// ```no_run
/// use pantip_harvest::client::build_http_client;
/// use pantip_harvest::config::HttpConfig;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().gzip(true).brotli(true);

    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
}

/// Headers sent with every comment-render request
pub fn comment_headers(user_agent: &str) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, user_agent_value(user_agent)?);
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );
    Ok(headers)
}

/// Headers sent with every search request
pub fn search_headers(user_agent: &str) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json;charset=UTF-8"),
    );
    headers.insert(ORIGIN, HeaderValue::from_static("https://pantip.com"));
    headers.insert(
        HeaderName::from_static("priority"),
        HeaderValue::from_static("u=1, i"),
    );
    headers.insert(
        HeaderName::from_static("ptauthorize"),
        HeaderValue::from_static("Basic dGVzdGVyOnRlc3Rlcg=="),
    );
    headers.insert(
        REFERER,
        HeaderValue::from_static("https://pantip.com/search?q=cat"),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua"),
        HeaderValue::from_static(
            "\"Not/A)Brand\";v=\"8\", \"Chromium\";v=\"126\", \"Google Chrome\";v=\"126\"",
        ),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-mobile"),
        HeaderValue::from_static("?0"),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-platform"),
        HeaderValue::from_static("\"macOS\""),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("empty"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("cors"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(USER_AGENT, user_agent_value(user_agent)?);
    Ok(headers)
}

fn user_agent_value(user_agent: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(user_agent).map_err(|e| {
        ConfigError::Validation(format!("Invalid user agent '{}': {}", user_agent, e))
    })
}
