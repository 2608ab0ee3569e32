//! User profile retrieval
//!
//! Fetches `<profile-base>/<user_id>#topics` through a [`Renderer`] and
//! extracts a [`UserProfile`] from the page markup.

mod parser;
mod renderer;

pub use parser::{parse_profile, FeedPost, UserProfile};
pub use renderer::Renderer;

use crate::client::{build_http_client, comment_headers};
use crate::config::{Config, RendererKind};
use crate::{ConfigError, FetchError};

/// Fetches and parses profile pages
pub struct ProfileFetcher {
    renderer: Renderer,
    profile_base: String,
}

impl ProfileFetcher {
    pub fn new(renderer: Renderer, profile_base: impl Into<String>) -> Self {
        Self {
            renderer,
            profile_base: profile_base.into(),
        }
    }

    /// Creates a fetcher from configuration, building its own client
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let client = build_http_client(&config.http)?;

        let renderer = match config.profile.renderer {
            RendererKind::Direct => Renderer::Direct {
                client,
                headers: comment_headers(&config.http.comment_user_agent)?,
            },
            RendererKind::Browserless => {
                let base_url = config.profile.browserless_url.clone().ok_or_else(|| {
                    ConfigError::Validation(
                        "renderer = \"browserless\" requires browserless_url".to_string(),
                    )
                })?;
                Renderer::Browserless {
                    client,
                    base_url,
                    token: config.profile.browserless_token.clone(),
                    settle_ms: config.profile.settle_ms,
                }
            }
        };

        Ok(Self::new(renderer, config.endpoints.profile.clone()))
    }

    /// URL of a user's profile page, opened on the topics tab
    pub fn profile_url(&self, user_id: &str) -> String {
        format!(
            "{}/{}#topics",
            self.profile_base.trim_end_matches('/'),
            user_id
        )
    }

    /// Fetches and parses one user's profile
    pub async fn fetch(&self, user_id: &str) -> Result<UserProfile, FetchError> {
        let url = self.profile_url(user_id);
        tracing::debug!("Fetching profile {}", url);

        let html = self.renderer.render(&url).await?;
        let profile = parse_profile(&html);

        tracing::info!(
            "Profile {} parsed: {} feed posts",
            user_id,
            profile.profile_feed.len()
        );
        Ok(profile)
    }
}
