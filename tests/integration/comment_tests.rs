//! Integration tests for batched comment fetching
//!
//! These tests use wiremock to stand in for the comment-render endpoint.

use pantip_harvest::client::{build_http_client, comment_headers};
use pantip_harvest::comments::CommentFetcher;
use pantip_harvest::config::HttpConfig;
use pantip_harvest::progress::ProgressSink;
use pantip_harvest::{extract_keyword_ids, KeywordIdIndex, TopicId};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const USER_AGENT: &str = "TestBot/1.0";

/// Records what a fetcher reports
#[derive(Default)]
struct CountingProgress {
    total: AtomicU64,
    advanced: AtomicU64,
    finished: AtomicBool,
}

impl ProgressSink for CountingProgress {
    fn start(&self, _label: &str, total: u64) {
        self.total.store(total, Ordering::SeqCst);
    }

    fn advance(&self) {
        self.advanced.fetch_add(1, Ordering::SeqCst);
    }

    fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }
}

/// Answers after a fixed delay and records when each request arrived
#[derive(Clone, Default)]
struct ArrivalLog {
    arrivals: Arc<Mutex<Vec<Instant>>>,
    delay: Duration,
}

impl ArrivalLog {
    fn with_delay(delay: Duration) -> Self {
        Self {
            arrivals: Arc::default(),
            delay,
        }
    }

    fn sorted(&self) -> Vec<Instant> {
        let mut arrivals = self.arrivals.lock().unwrap().clone();
        arrivals.sort();
        arrivals
    }
}

impl Respond for ArrivalLog {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(200)
            .set_body_json(json!({"comments": []}))
            .set_delay(self.delay)
    }
}

/// No more than `workers` requests may start within one response delay
fn assert_at_most_in_flight(arrivals: &[Instant], workers: usize, delay: Duration) {
    for window in arrivals.windows(workers + 1) {
        let spread = window[workers] - window[0];
        assert!(
            spread >= delay,
            "{} requests started within {:?}",
            workers + 1,
            spread
        );
    }
}

fn create_fetcher(endpoint: &str) -> CommentFetcher {
    let client = build_http_client(&HttpConfig::default()).expect("Failed to build client");
    let headers = comment_headers(USER_AGENT).expect("Failed to build headers");
    CommentFetcher::new(client, endpoint, headers)
}

fn topic_ids(raw: &[&str]) -> Vec<TopicId> {
    raw.iter().map(|s| TopicId::from(*s)).collect()
}

async fn mount_topic(server: &MockServer, tid: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/forum/topic/render_comments"))
        .and(query_param("tid", tid))
        .and(query_param("type", "3"))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_comments_skips_non_200_ids() {
    let mock_server = MockServer::start().await;

    for tid in ["1", "3", "5"] {
        mount_topic(
            &mock_server,
            tid,
            ResponseTemplate::new(200).set_body_json(json!({"tid": tid, "comments": []})),
        )
        .await;
    }
    mount_topic(&mock_server, "2", ResponseTemplate::new(500)).await;
    mount_topic(&mock_server, "4", ResponseTemplate::new(404)).await;

    let fetcher = create_fetcher(&format!(
        "{}/forum/topic/render_comments",
        mock_server.uri()
    ));
    let (keyword, comments) = fetcher
        .fetch_comments("cat", &topic_ids(&["1", "2", "3", "4", "5"]))
        .await;

    assert_eq!(keyword, "cat");
    let keys: Vec<&str> = comments.keys().map(TopicId::as_str).collect();
    assert_eq!(keys, vec!["1", "3", "5"]);
    assert_eq!(
        comments[&TopicId::from("3")],
        json!({"tid": "3", "comments": []})
    );
}

#[tokio::test]
async fn test_fetch_comments_skips_undecodable_body() {
    let mock_server = MockServer::start().await;

    mount_topic(
        &mock_server,
        "1",
        ResponseTemplate::new(200).set_body_string("<html>not json</html>"),
    )
    .await;
    mount_topic(
        &mock_server,
        "2",
        ResponseTemplate::new(200).set_body_json(json!({"ok": true})),
    )
    .await;

    let fetcher = create_fetcher(&format!(
        "{}/forum/topic/render_comments",
        mock_server.uri()
    ));
    let (_, comments) = fetcher.fetch_comments("cat", &topic_ids(&["1", "2"])).await;

    assert_eq!(comments.len(), 1);
    assert!(comments.contains_key(&TopicId::from("2")));
}

#[tokio::test]
async fn test_network_failure_yields_empty_result() {
    // Nothing listens on port 9
    let fetcher = create_fetcher("http://127.0.0.1:9/forum/topic/render_comments");

    let (_, comments) = fetcher.fetch_comments("cat", &topic_ids(&["1", "2"])).await;
    assert!(comments.is_empty());

    let mut index = KeywordIdIndex::new();
    index.insert("cat".to_string(), topic_ids(&["1", "2"]));
    let results = fetcher.fetch_all(&index, 2).await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_fetch_all_batches_large_keyword() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forum/topic/render_comments"))
        .and(query_param("type", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"comments": []})))
        .expect(1302)
        .mount(&mock_server)
        .await;

    let mut index = KeywordIdIndex::new();
    index.insert(
        "cat".to_string(),
        (0..1300u64).map(TopicId::from).collect(),
    );
    index.insert("dog".to_string(), topic_ids(&["9001", "9002"]));

    let progress = Arc::new(CountingProgress::default());
    let fetcher = create_fetcher(&format!(
        "{}/forum/topic/render_comments",
        mock_server.uri()
    ))
    .with_progress(progress.clone());

    let results = fetcher.fetch_all(&index, 3).await;

    // 600 + 600 + 100 for "cat", one batch for "dog"
    assert_eq!(progress.total.load(Ordering::SeqCst), 4);
    assert_eq!(progress.advanced.load(Ordering::SeqCst), 4);
    assert!(progress.finished.load(Ordering::SeqCst));

    assert_eq!(results.len(), 2);
    assert_eq!(results["cat"].len(), 1300);
    assert_eq!(results["dog"].len(), 2);
}

#[tokio::test]
async fn test_keyword_with_only_failures_is_absent() {
    let mock_server = MockServer::start().await;

    mount_topic(
        &mock_server,
        "1",
        ResponseTemplate::new(200).set_body_json(json!({"ok": 1})),
    )
    .await;
    mount_topic(&mock_server, "2", ResponseTemplate::new(503)).await;

    let mut index = KeywordIdIndex::new();
    index.insert("cat".to_string(), topic_ids(&["1"]));
    index.insert("dog".to_string(), topic_ids(&["2"]));
    index.insert("bird".to_string(), Vec::new());

    let fetcher = create_fetcher(&format!(
        "{}/forum/topic/render_comments",
        mock_server.uri()
    ));
    let results = fetcher.fetch_all(&index, 4).await;

    assert_eq!(results.len(), 1);
    assert!(results.contains_key("cat"));
}

#[tokio::test]
async fn test_search_output_to_comments() {
    let mock_server = MockServer::start().await;

    for tid in ["101", "102", "201"] {
        mount_topic(
            &mock_server,
            tid,
            ResponseTemplate::new(200).set_body_json(json!({"tid": tid})),
        )
        .await;
    }

    let search_output = json!({
        "0": {
            "search_keyword": "cat",
            "total_results": 2,
            "0": {"total": 2, "data": [{"id": 101}, {"id": "102"}]},
            "1": {"data": []}
        },
        "1": {
            "search_keyword": "dog",
            "total_results": null,
            "0": {"data": [{"id": 201}]}
        },
        "2": {
            "0": {"data": [{"id": 301}]}
        }
    });

    let index = extract_keyword_ids(&search_output);
    assert_eq!(index.len(), 2);

    let fetcher = create_fetcher(&format!(
        "{}/forum/topic/render_comments",
        mock_server.uri()
    ));
    let results = fetcher.fetch_all(&index, 2).await;

    assert_eq!(results["cat"].len(), 2);
    assert_eq!(results["dog"][&TopicId::from("201")], json!({"tid": "201"}));
}

#[tokio::test]
async fn test_fetch_all_respects_worker_limit() {
    let mock_server = MockServer::start().await;
    let delay = Duration::from_millis(150);
    let log = ArrivalLog::with_delay(delay);

    Mock::given(method("GET"))
        .and(path("/forum/topic/render_comments"))
        .respond_with(log.clone())
        .expect(4)
        .mount(&mock_server)
        .await;

    // One id per keyword, so every keyword is its own batch
    let mut index = KeywordIdIndex::new();
    for (keyword, tid) in [("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")] {
        index.insert(keyword.to_string(), topic_ids(&[tid]));
    }

    let fetcher = create_fetcher(&format!(
        "{}/forum/topic/render_comments",
        mock_server.uri()
    ));

    let results = fetcher.fetch_all(&index, 1).await;
    assert_eq!(results.len(), 4);
    assert_at_most_in_flight(&log.sorted(), 1, delay);
}

#[tokio::test]
async fn test_ids_in_one_batch_never_overlap() {
    let mock_server = MockServer::start().await;
    let delay = Duration::from_millis(100);
    let log = ArrivalLog::with_delay(delay);

    Mock::given(method("GET"))
        .and(path("/forum/topic/render_comments"))
        .respond_with(log.clone())
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut index = KeywordIdIndex::new();
    index.insert("cat".to_string(), topic_ids(&["1", "2", "3"]));

    let fetcher = create_fetcher(&format!(
        "{}/forum/topic/render_comments",
        mock_server.uri()
    ));

    // Plenty of workers, but a single batch runs its ids one at a time
    let results = fetcher.fetch_all(&index, 8).await;
    assert_eq!(results["cat"].len(), 3);
    assert_at_most_in_flight(&log.sorted(), 1, delay);
}

#[tokio::test]
async fn test_oversized_worker_count_is_clamped() {
    let mock_server = MockServer::start().await;

    mount_topic(
        &mock_server,
        "1",
        ResponseTemplate::new(200).set_body_json(json!({"ok": 1})),
    )
    .await;

    let mut index = KeywordIdIndex::new();
    index.insert("cat".to_string(), topic_ids(&["1"]));

    let fetcher = create_fetcher(&format!(
        "{}/forum/topic/render_comments",
        mock_server.uri()
    ));

    let results = fetcher.fetch_all(&index, usize::MAX).await;
    assert_eq!(results["cat"].len(), 1);

    let results = fetcher.fetch_all(&index, 0).await;
    assert_eq!(results["cat"].len(), 1);
}
