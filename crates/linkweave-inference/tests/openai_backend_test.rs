//! Integration tests for the OpenAI-compatible backend against a mock server.

use linkweave_core::{Error, SuggestionBackend};
use linkweave_inference::{OpenAICompatibleBackend, OpenAiCompatibleConfig};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

fn config(server: &MockServer, api_key: Option<&str>) -> OpenAiCompatibleConfig {
    OpenAiCompatibleConfig {
        base_url: format!("{}/v1/", server.uri()),
        model: "test-gen".to_string(),
        api_key: api_key.map(str::to_string),
    }
}

#[tokio::test]
async fn test_request_wire_format_with_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "model": "test-gen",
            "messages": [{"role": "user", "content": "find links"}],
            "response_format": {"type": "json_object"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(r#"[{"post_id_to_link": "2"}]"#)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = OpenAICompatibleBackend::new(config(&mock_server, Some("sk-test"))).unwrap();
    let result = backend.get_suggestions("find links").await;

    assert!(result.is_ok(), "Request should succeed: {:?}", result.err());
    assert_eq!(result.unwrap(), json!([{"post_id_to_link": "2"}]));
}

#[tokio::test]
async fn test_authorization_not_sent_without_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(|req: &Request| {
            if req.headers.contains_key("authorization") {
                ResponseTemplate::new(400).set_body_string("unexpected auth header")
            } else {
                ResponseTemplate::new(200).set_body_json(completion(r#"{"suggestions": []}"#))
            }
        })
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = OpenAICompatibleBackend::new(config(&mock_server, None)).unwrap();
    let result = backend.get_suggestions("prompt").await.unwrap();
    assert_eq!(result, json!({"suggestions": []}));
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("{\"error\":\"overloaded\"}"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = OpenAICompatibleBackend::new(config(&mock_server, None)).unwrap();
    let err = backend.get_suggestions("prompt").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("overloaded"));
}

#[tokio::test]
async fn test_fenced_content_is_accepted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("```json\n{\"suggestions\": []}\n```")),
        )
        .mount(&mock_server)
        .await;

    let backend = OpenAICompatibleBackend::new(config(&mock_server, None)).unwrap();
    let result = backend.get_suggestions("prompt").await.unwrap();
    assert_eq!(result, json!({"suggestions": []}));
}

#[tokio::test]
async fn test_missing_choices_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&mock_server)
        .await;

    let backend = OpenAICompatibleBackend::new(config(&mock_server, None)).unwrap();
    let err = backend.get_suggestions("prompt").await.unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)), "got {:?}", err);
}
