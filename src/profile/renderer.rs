//! Page sources for profile pages
//!
//! Profile pages fill in parts of their markup with scripts, so the HTML can
//! come either straight from the site or from a Browserless `/content`
//! service that loads the page in a headless browser first.

use crate::FetchError;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};

/// Where rendered page HTML comes from
#[derive(Debug, Clone)]
pub enum Renderer {
    /// Plain GET of the page
    Direct { client: Client, headers: HeaderMap },

    /// POST to a Browserless `/content` endpoint
    Browserless {
        client: Client,
        base_url: String,
        token: Option<String>,
        /// Wait after page load before the HTML is captured
        settle_ms: u64,
    },
}

impl Renderer {
    /// Returns the page HTML for `url`
    pub async fn render(&self, url: &str) -> Result<String, FetchError> {
        match self {
            Renderer::Direct { client, headers } => fetch_direct(client, headers, url).await,
            Renderer::Browserless {
                client,
                base_url,
                token,
                settle_ms,
            } => fetch_rendered(client, base_url, token.as_deref(), *settle_ms, url).await,
        }
    }
}

async fn fetch_direct(client: &Client, headers: &HeaderMap, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .headers(headers.clone())
        .send()
        .await
        .map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| FetchError::Network {
        url: url.to_string(),
        source,
    })
}

async fn fetch_rendered(
    client: &Client,
    base_url: &str,
    token: Option<&str>,
    settle_ms: u64,
    url: &str,
) -> Result<String, FetchError> {
    let endpoint = format!("{}/content", base_url.trim_end_matches('/'));

    let body = serde_json::json!({
        "url": url,
        "waitForTimeout": settle_ms,
    });

    let mut request = client.post(&endpoint).json(&body);
    if let Some(token) = token {
        request = request.query(&[("token", token)]);
    }

    let response = request
        .send()
        .await
        .map_err(|source| FetchError::Network {
            url: endpoint.clone(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(FetchError::Render {
            url: url.to_string(),
            message: format!("status {}: {}", status.as_u16(), message),
        });
    }

    response.text().await.map_err(|source| FetchError::Network {
        url: endpoint,
        source,
    })
}
