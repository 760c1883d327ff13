//! Integration tests for the coordinator API client
//!
//! These run against a wiremock server standing in for the coordinator.

use eurocrawl::coordinator::{
    ContentSubmission, CoordinatorClient, CoordinatorError, LinkSubmission,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_next_parses_tasks() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/urls"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "url": "https://example.com/a",
                "priority": 5,
                "domain": "example.com",
                "status": "pending"
            },
            {
                "id": 2,
                "url": "https://example.com/b",
                "priority": 7,
                "domain": "example.com",
                "status": "pending"
            }
        ])))
        .mount(&server)
        .await;

    let client = CoordinatorClient::new(&server.uri(), "v1").unwrap();
    let tasks = client.fetch_next(5).await.unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, 1);
    assert_eq!(tasks[0].url, "https://example.com/a");
    assert_eq!(tasks[1].priority, 7);
    assert_eq!(tasks[1].domain, "example.com");
}

#[tokio::test]
async fn test_fetch_next_empty_frontier() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = CoordinatorClient::new(&server.uri(), "v1").unwrap();
    let tasks = client.fetch_next(10).await.unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn test_api_version_in_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = CoordinatorClient::new(&server.uri(), "v2").unwrap();
    client.fetch_next(1).await.unwrap();
}

#[tokio::test]
async fn test_mark_status_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/urls/42/crawling"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/urls/42/completed"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = CoordinatorClient::new(&server.uri(), "v1").unwrap();
    client.mark_crawling(42).await.unwrap();
    client.mark_completed(42).await.unwrap();
}

#[tokio::test]
async fn test_mark_failed_sends_reason() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/urls/7/failed"))
        .and(body_json(json!({"error_message": "HTTP 404"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = CoordinatorClient::new(&server.uri(), "v1").unwrap();
    client.mark_failed(7, "HTTP 404").await.unwrap();
}

#[tokio::test]
async fn test_submit_content_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/content"))
        .and(body_json(json!({
            "url_id": 3,
            "title": "A Page",
            "content": "body text",
            "language": "de"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 90, "status": "accepted"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = CoordinatorClient::new(&server.uri(), "v1").unwrap();
    let receipt = client
        .submit_content(&ContentSubmission {
            url_id: 3,
            title: Some("A Page".to_string()),
            content: "body text".to_string(),
            language: Some("de".to_string()),
            author: None,
            date: None,
        })
        .await
        .unwrap();

    assert_eq!(receipt.id, 90);
    assert_eq!(receipt.status, "accepted");
}

#[tokio::test]
async fn test_submit_links_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/links"))
        .and(body_json(json!({
            "source_url": "https://example.com/page",
            "links": [
                {"url": "https://example.com/a", "priority": 6},
                {"url": "https://example.com/b", "priority": 6}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"added": 1, "skipped": 1, "total": 2})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = CoordinatorClient::new(&server.uri(), "v1").unwrap();
    let receipt = client
        .submit_links(
            "https://example.com/page",
            &[
                LinkSubmission {
                    url: "https://example.com/a".to_string(),
                    priority: 6,
                },
                LinkSubmission {
                    url: "https://example.com/b".to_string(),
                    priority: 6,
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(receipt.added, 1);
    assert_eq!(receipt.skipped, 1);
    assert_eq!(receipt.total, 2);
}

#[tokio::test]
async fn test_non_2xx_is_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/urls/5/completed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = CoordinatorClient::new(&server.uri(), "v1").unwrap();
    let result = client.mark_completed(5).await;

    match result {
        Err(CoordinatorError::Status { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected status error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = CoordinatorClient::new(&format!("{}/", server.uri()), "v1").unwrap();
    client.fetch_next(1).await.unwrap();
}
