//! Integration tests for the Gemini backend against a mock server.

use linkweave_core::{Error, SuggestionBackend};
use linkweave_inference::{GeminiBackend, GeminiConfig};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn backend(server: &MockServer, api_key: &str) -> GeminiBackend {
    GeminiBackend::new(GeminiConfig {
        api_key: api_key.to_string(),
        endpoint: format!("{}{}", server.uri(), GENERATE_PATH),
    })
    .expect("Failed to create backend")
}

fn generation(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn test_request_wire_format_and_json_extraction() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-key"))
        .and(body_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "find links"}]}],
            "generationConfig": {"responseMimeType": "application/json"}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(generation(r#"{"suggestions": [{"post_id_to_link": 4}]}"#)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = backend(&mock_server, "test-key")
        .get_suggestions("find links")
        .await
        .expect("Request should succeed");

    assert_eq!(result, json!({"suggestions": [{"post_id_to_link": 4}]}));
}

#[tokio::test]
async fn test_non_success_status_carries_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = backend(&mock_server, "bad-key")
        .get_suggestions("prompt")
        .await
        .unwrap_err();

    match err {
        Error::ApiError { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "API key not valid");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_text_path_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        })))
        .mount(&mock_server)
        .await;

    let err = backend(&mock_server, "k")
        .get_suggestions("prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unparseable_model_text_is_invalid_response_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(generation("not json at all")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = backend(&mock_server, "k")
        .get_suggestions("prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_missing_key_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generation("{}")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = backend(&mock_server, "")
        .get_suggestions("prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConfigMissing(_)));
}

#[tokio::test]
async fn test_no_content_status_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = backend(&mock_server, "k")
        .get_suggestions("prompt")
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::ApiError { status: 204, .. }),
        "got {:?}",
        err
    );
}

#[tokio::test]
async fn test_api_key_stays_out_of_transport_errors() {
    let backend = GeminiBackend::new(GeminiConfig {
        api_key: "SUPERSECRETKEY".to_string(),
        endpoint: format!("http://127.0.0.1:1{}", GENERATE_PATH),
    })
    .expect("Failed to create backend");

    let err = backend.get_suggestions("prompt").await.unwrap_err();
    assert!(matches!(err, Error::Request(_)), "got {:?}", err);
    assert!(!err.to_string().contains("SUPERSECRETKEY"), "{}", err);
    assert!(!format!("{:?}", err).contains("SUPERSECRETKEY"));
}

#[tokio::test]
async fn test_api_key_stays_out_of_decode_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy login</html>"))
        .mount(&mock_server)
        .await;

    let err = backend(&mock_server, "SUPERSECRETKEY")
        .get_suggestions("prompt")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)), "got {:?}", err);
    assert!(!err.to_string().contains("SUPERSECRETKEY"), "{}", err);
}
