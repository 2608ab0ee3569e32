use serde::Deserialize;

/// Comment-render endpoint (JSON comments for one topic)
pub const DEFAULT_COMMENTS_ENDPOINT: &str = "http://pantip.com/forum/topic/render_comments";

/// Search service endpoint
pub const DEFAULT_SEARCH_ENDPOINT: &str =
    "https://pantip.com/api/search-service/search/getresult";

/// Base of the profile pages; the user id is appended as a path segment
pub const DEFAULT_PROFILE_ENDPOINT: &str = "http://www.pantip.com/profile";

const DEFAULT_COMMENT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/53.0.2785.143 Safari/537.36";

const DEFAULT_SEARCH_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Main configuration structure for Pantip-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub comments: CommentsConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
}

/// HTTP client behavior
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds; no timeout when absent
    #[serde(rename = "timeout-secs", default)]
    pub timeout_secs: Option<u64>,

    /// User agent sent to the comment-render endpoint and profile pages
    #[serde(rename = "comment-user-agent", default = "default_comment_user_agent")]
    pub comment_user_agent: String,

    /// User agent sent to the search service
    #[serde(rename = "search-user-agent", default = "default_search_user_agent")]
    pub search_user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            comment_user_agent: default_comment_user_agent(),
            search_user_agent: default_search_user_agent(),
        }
    }
}

/// Endpoint URLs
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_comments_endpoint")]
    pub comments: String,

    #[serde(default = "default_search_endpoint")]
    pub search: String,

    #[serde(default = "default_profile_endpoint")]
    pub profile: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            comments: default_comments_endpoint(),
            search: default_search_endpoint(),
            profile: default_profile_endpoint(),
        }
    }
}

/// Batch comment fetching
#[derive(Debug, Clone, Deserialize)]
pub struct CommentsConfig {
    /// Number of batches fetched concurrently
    #[serde(rename = "max-workers", default = "default_workers")]
    pub max_workers: usize,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            max_workers: default_workers(),
        }
    }
}

/// Paged search fetching
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Highest page number requested (pages `0..=page_count`)
    #[serde(rename = "page-count", default = "default_page_count")]
    pub page_count: u32,

    /// Number of pages fetched concurrently
    #[serde(rename = "max-workers", default = "default_workers")]
    pub max_workers: usize,

    /// Delay after each examined completion (milliseconds)
    #[serde(rename = "throttle-ms", default = "default_throttle_ms")]
    pub throttle_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_count: default_page_count(),
            max_workers: default_workers(),
            throttle_ms: default_throttle_ms(),
        }
    }
}

/// How profile pages are obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Plain GET of the page HTML
    #[default]
    Direct,
    /// Rendered by a Browserless `/content` service
    Browserless,
}

/// Profile page fetching
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    #[serde(default)]
    pub renderer: RendererKind,

    #[serde(rename = "browserless-url", default)]
    pub browserless_url: Option<String>,

    #[serde(rename = "browserless-token", default)]
    pub browserless_token: Option<String>,

    /// Time the renderer waits after load before capturing the page (milliseconds)
    #[serde(rename = "settle-ms", default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            renderer: RendererKind::Direct,
            browserless_url: None,
            browserless_token: None,
            settle_ms: default_settle_ms(),
        }
    }
}

fn default_comment_user_agent() -> String {
    DEFAULT_COMMENT_USER_AGENT.to_string()
}

fn default_search_user_agent() -> String {
    DEFAULT_SEARCH_USER_AGENT.to_string()
}

fn default_comments_endpoint() -> String {
    DEFAULT_COMMENTS_ENDPOINT.to_string()
}

fn default_search_endpoint() -> String {
    DEFAULT_SEARCH_ENDPOINT.to_string()
}

fn default_profile_endpoint() -> String {
    DEFAULT_PROFILE_ENDPOINT.to_string()
}

fn default_workers() -> usize {
    8
}

fn default_page_count() -> u32 {
    10
}

fn default_throttle_ms() -> u64 {
    100
}

fn default_settle_ms() -> u64 {
    1000
}
