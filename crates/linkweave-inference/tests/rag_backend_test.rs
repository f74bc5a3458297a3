//! Integration tests for the RAG backend's two-step protocol.

use linkweave_core::{Error, SourceBackend};
use linkweave_inference::{RagBackend, RagConfig};
use serde_json::json;
use std::collections::HashSet;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> RagBackend {
    RagBackend::new(RagConfig {
        base_url: Some(format!("{}/", server.uri())),
        user_ip: "203.0.113.9".to_string(),
    })
    .expect("Failed to create backend")
}

async fn mount_handshake(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/conversation/get_id"))
        .and(body_json(json!({"conversation_id": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_two_step_protocol_and_normalization() {
    let mock_server = MockServer::start().await;
    mount_handshake(&mock_server, json!({"conversationId": "conv-1"})).await;

    let sources: Vec<serde_json::Value> = (0..8)
        .map(|i| {
            json!({
                "title": format!("Doc {}", i % 6),
                "url": format!("https://kb.example/{}", i % 6),
                "deep_link_url": format!("https://kb.example/{}#:~:text=x", i % 6),
                "text": "x".repeat(300)
            })
        })
        .collect();

    Mock::given(method("POST"))
        .and(path("/api/chat/conv-1"))
        .and(body_json(json!({
            "user_ip": "203.0.113.9",
            "message": "tokio runtime",
            "user_type": "general"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "ignored",
            "sources": sources
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = backend(&mock_server).get_sources("tokio runtime").await.unwrap();

    assert_eq!(result.len(), 5);
    let urls: HashSet<&str> = result.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(urls.len(), 5);
    assert_eq!(result[0].title, "Doc 0");
    assert_eq!(result[0].url, "https://kb.example/0#:~:text=x");
    assert!(result.iter().all(|s| s.snippet.chars().count() == 200));
}

#[tokio::test]
async fn test_missing_conversation_id_is_invalid_response() {
    let mock_server = MockServer::start().await;
    mount_handshake(&mock_server, json!({})).await;

    Mock::given(method("POST"))
        .and(path("/api/chat/undefined"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sources": []})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = backend(&mock_server).get_sources("q").await.unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_handshake_failure_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/conversation/get_id"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = backend(&mock_server).get_sources("q").await.unwrap_err();
    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn test_chat_failure_is_api_error() {
    let mock_server = MockServer::start().await;
    mount_handshake(&mock_server, json!({"conversationId": 77})).await;

    Mock::given(method("POST"))
        .and(path("/api/chat/77"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = backend(&mock_server).get_sources("q").await.unwrap_err();
    match err {
        Error::ApiError { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "slow down");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_sources_defaults_to_empty() {
    let mock_server = MockServer::start().await;
    mount_handshake(&mock_server, json!({"conversationId": "c"})).await;

    Mock::given(method("POST"))
        .and(path("/api/chat/c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "no idea"})))
        .mount(&mock_server)
        .await;

    let result = backend(&mock_server).get_sources("q").await.unwrap();
    assert!(result.is_empty());
}
