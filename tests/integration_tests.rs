use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use updatecheck::{
    GitHubReleaseSource, ReleaseSource, ReleaseVersion, UpdateCheckError, UpdateChecker,
    UpdateCheckerConfig,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn releases_json(tags: &[&str]) -> serde_json::Value {
    let releases: Vec<_> = tags
        .iter()
        .map(|tag| {
            serde_json::json!({
                "tag_name": tag,
                "name": format!("Release {}", tag),
                "prerelease": false,
                "draft": false,
                "html_url": format!("https://github.com/test/repo/releases/tag/{}", tag),
                "published_at": "2024-03-15T10:00:00Z"
            })
        })
        .collect();
    serde_json::Value::Array(releases)
}

async fn mount_releases(mock_server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/repos/test/repo/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(mock_server)
        .await;
}

fn checker_for(mock_server: &MockServer) -> UpdateChecker {
    let config = UpdateCheckerConfig::new("test", "repo", ReleaseVersion::new(1, 0, 0, 1))
        .base_url(mock_server.uri());
    UpdateChecker::new(config).unwrap()
}

fn count_notifications(checker: &UpdateChecker) -> Arc<AtomicUsize> {
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    checker.on_status_changed(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    notified
}

#[tokio::test]
async fn test_update_available_when_newer_release_exists() {
    let mock_server = MockServer::start().await;
    mount_releases(&mock_server, releases_json(&["v1.0.0.1", "v1.0.0.2"])).await;

    let checker = checker_for(&mock_server);
    assert_eq!(checker.is_update_available(), None);

    let outcome = checker.check_for_update().await;

    assert!(outcome.update_available);
    assert_eq!(outcome.latest_version, Some(ReleaseVersion::new(1, 0, 0, 2)));
    assert_eq!(checker.is_update_available(), Some(true));
}

#[tokio::test]
async fn test_no_update_when_on_latest() {
    let mock_server = MockServer::start().await;
    mount_releases(&mock_server, releases_json(&["v1.0.0.1"])).await;

    let checker = checker_for(&mock_server);
    let outcome = checker.check_for_update().await;

    assert!(!outcome.update_available);
    assert_eq!(checker.is_update_available(), Some(false));
}

#[tokio::test]
async fn test_fetch_failure_reports_no_update_and_notifies_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/test/repo/releases"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let checker = checker_for(&mock_server);
    let notified = count_notifications(&checker);

    let outcome = checker.check_for_update().await;

    assert!(!outcome.update_available);
    assert!(outcome.latest_version.is_none());
    assert_eq!(checker.is_update_available(), Some(false));
    assert_eq!(notified.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_tag_skipped() {
    let mock_server = MockServer::start().await;
    mount_releases(&mock_server, releases_json(&["not-a-version", "v0.9.0.0"])).await;

    let checker = checker_for(&mock_server);
    let notified = count_notifications(&checker);

    let outcome = checker.check_for_update().await;

    assert!(!outcome.update_available);
    assert_eq!(outcome.latest_version, Some(ReleaseVersion::new(1, 0, 0, 1)));
    assert_eq!(notified.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_releases() {
    let mock_server = MockServer::start().await;
    mount_releases(&mock_server, serde_json::json!([])).await;

    let checker = checker_for(&mock_server);
    let outcome = checker.check_for_update().await;

    assert!(!outcome.update_available);
    assert_eq!(outcome.latest_version, Some(ReleaseVersion::new(1, 0, 0, 1)));
}

#[tokio::test]
async fn test_malformed_response_reports_no_update() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/test/repo/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let checker = checker_for(&mock_server);
    let outcome = checker.check_for_update().await;

    assert!(!outcome.update_available);
    assert!(outcome.latest_version.is_none());
}

#[tokio::test]
async fn test_release_order_does_not_matter() {
    let mock_server = MockServer::start().await;
    mount_releases(
        &mock_server,
        releases_json(&["v1.0.0.3", "v2.0.0.0", "v1.9.9.9", "v0.1"]),
    )
    .await;

    let checker = checker_for(&mock_server);
    let outcome = checker.check_for_update().await;

    assert!(outcome.update_available);
    assert_eq!(outcome.latest_version, Some(ReleaseVersion::new(2, 0, 0, 0)));
}

#[tokio::test]
async fn test_draft_releases_are_ignored() {
    let mock_server = MockServer::start().await;

    let releases = serde_json::json!([
        { "tag_name": "v1.0.0.1", "draft": false },
        { "tag_name": "v9.0.0.0", "draft": true }
    ]);
    mount_releases(&mock_server, releases).await;

    let checker = checker_for(&mock_server);
    let outcome = checker.check_for_update().await;

    assert!(!outcome.update_available);
}

#[tokio::test]
async fn test_request_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/test/repo/releases"))
        .and(header("Accept", "application/vnd.github+json"))
        .and(header("X-GitHub-Api-Version", "2022-11-28"))
        .and(header("User-Agent", "my-app/1.0.0.1"))
        .and(header("Authorization", "Bearer test-token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(releases_json(&["v1.0.0.2"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = UpdateCheckerConfig::new("test", "repo", ReleaseVersion::new(1, 0, 0, 1))
        .token("test-token-123")
        .user_agent("my-app/1.0.0.1")
        .base_url(mock_server.uri());
    let checker = UpdateChecker::new(config).unwrap();

    let outcome = checker.check_for_update().await;
    assert!(outcome.update_available);
}

#[tokio::test]
async fn test_each_check_fetches_again() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/test/repo/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(releases_json(&["v1.0.0.1"])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let checker = checker_for(&mock_server);
    let notified = count_notifications(&checker);

    checker.check_for_update().await;
    checker.check_for_update().await;

    assert_eq!(notified.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_request_timeout_reports_no_update() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/test/repo/releases"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(releases_json(&["v2.0.0.0"]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let config = UpdateCheckerConfig::new("test", "repo", ReleaseVersion::new(1, 0, 0, 1))
        .timeout(Duration::from_millis(100))
        .base_url(mock_server.uri());
    let checker = UpdateChecker::new(config).unwrap();

    let outcome = checker.check_for_update().await;

    assert!(!outcome.update_available);
    assert!(outcome.latest_version.is_none());
}

#[tokio::test]
async fn test_spawned_check_does_not_block_caller() {
    let mock_server = MockServer::start().await;
    mount_releases(&mock_server, releases_json(&["v1.0.0.2"])).await;

    let checker = Arc::new(checker_for(&mock_server));
    let handle = checker.clone().spawn_check();

    let outcome = handle.await.unwrap();
    assert!(outcome.update_available);
    assert_eq!(checker.last_outcome(), Some(outcome));
}

#[tokio::test]
async fn test_source_follows_pages() {
    let mock_server = MockServer::start().await;

    let first_page: Vec<String> = (0..100).map(|i| format!("v1.0.0.{}", i)).collect();
    let first_page: Vec<&str> = first_page.iter().map(String::as_str).collect();

    Mock::given(method("GET"))
        .and(path("/repos/test/repo/releases"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(releases_json(&first_page)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/test/repo/releases"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(releases_json(&["v3.0.0.0"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let source = GitHubReleaseSource::new(
        mock_server.uri(),
        None,
        Duration::from_secs(5),
        "updatecheck-tests",
    )
    .unwrap();
    let tags = source.list_release_tags("test", "repo").await.unwrap();

    assert_eq!(tags.len(), 101);
    assert_eq!(tags.last().map(String::as_str), Some("v3.0.0.0"));
}

#[tokio::test]
async fn test_source_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/test/repo/releases"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let source = GitHubReleaseSource::new(
        mock_server.uri(),
        None,
        Duration::from_secs(5),
        "updatecheck-tests",
    )
    .unwrap();
    let result = source.list_release_tags("test", "repo").await;

    let Err(UpdateCheckError::ApiError { status, message }) = result else {
        panic!("Expected ApiError");
    };
    assert_eq!(status, 404);
    assert_eq!(message, "Not Found");
}

#[tokio::test]
async fn test_source_json_error() {
    let mock_server = MockServer::start().await;

    let body = serde_json::json!({ "message": "oops" });
    Mock::given(method("GET"))
        .and(path("/repos/test/repo/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let source = GitHubReleaseSource::new(
        mock_server.uri(),
        None,
        Duration::from_secs(5),
        "updatecheck-tests",
    )
    .unwrap();
    let result = source.list_release_tags("test", "repo").await;

    assert!(matches!(result, Err(UpdateCheckError::JsonError(_))));
}
