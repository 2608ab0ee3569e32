use crate::config::types::{
    CommentsConfig, Config, EndpointsConfig, HttpConfig, ProfileConfig, RendererKind,
    SearchConfig,
};
use crate::ConfigError;
use url::Url;

/// Upper bound on concurrent workers for any pool
pub const MAX_WORKERS: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_endpoints(&config.endpoints)?;
    validate_comments_config(&config.comments)?;
    validate_search_config(&config.search)?;
    validate_profile_config(&config.profile)?;
    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1 when set".to_string(),
        ));
    }

    if config.comment_user_agent.trim().is_empty() || config.search_user_agent.trim().is_empty()
    {
        return Err(ConfigError::Validation(
            "user agents cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_endpoints(config: &EndpointsConfig) -> Result<(), ConfigError> {
    validate_http_url("comments endpoint", &config.comments)?;
    validate_http_url("search endpoint", &config.search)?;
    validate_http_url("profile endpoint", &config.profile)?;
    Ok(())
}

fn validate_comments_config(config: &CommentsConfig) -> Result<(), ConfigError> {
    validate_workers("comments.max_workers", config.max_workers)
}

fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    validate_workers("search.max_workers", config.max_workers)
}

fn validate_profile_config(config: &ProfileConfig) -> Result<(), ConfigError> {
    if config.renderer == RendererKind::Browserless {
        match &config.browserless_url {
            Some(url) => validate_http_url("browserless_url", url)?,
            None => {
                return Err(ConfigError::Validation(
                    "renderer = \"browserless\" requires browserless_url".to_string(),
                ))
            }
        }
    }

    Ok(())
}

/// Checks a worker count, from config or a command-line override
pub fn validate_workers(name: &str, workers: usize) -> Result<(), ConfigError> {
    if workers < 1 || workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and {}, got {}",
            name, MAX_WORKERS, workers
        )));
    }
    Ok(())
}

/// Checks that a configured URL parses and uses http or https
fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            name, value
        )));
    }

    Ok(())
}
