//! HTTP plumbing shared by every provider backend.

use reqwest::{Client, Response, StatusCode};
use serde_json::Value as JsonValue;
use tracing::warn;

use linkweave_core::{Error, Result};

/// Build the HTTP client. Timeouts are applied per request.
pub(crate) fn build_client() -> Result<Client> {
    Client::builder()
        .build()
        .map_err(|e| Error::Request(format!("Failed to create HTTP client: {}", e)))
}

/// Render a reqwest error without its URL.
///
/// Gemini carries the API key in the query string, so request URLs never
/// reach error messages or logs.
pub(crate) fn describe(e: reqwest::Error) -> String {
    e.without_url().to_string()
}

/// Map a transport failure, naming the timeout when that is the cause.
pub(crate) fn send_error(provider: &str, timeout_secs: u64, e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Request(format!("{} timed out after {}s", provider, timeout_secs))
    } else {
        Error::Request(format!("{} request failed: {}", provider, describe(e)))
    }
}

/// Pass `200 OK` through; any other status, other 2xx codes included,
/// becomes [`Error::ApiError`] carrying the raw body.
pub(crate) async fn check_status(provider: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(
        component = provider,
        status = status.as_u16(),
        "Provider returned non-200 status"
    );
    Err(Error::ApiError {
        status: status.as_u16(),
        body,
    })
}

/// Read a 200 body as JSON.
pub(crate) async fn read_json(provider: &str, response: Response) -> Result<JsonValue> {
    let text = response
        .text()
        .await
        .map_err(|e| Error::Request(format!("{} body read failed: {}", provider, describe(e))))?;
    serde_json::from_str(&text).map_err(|e| {
        Error::InvalidResponse(format!("{} returned a non-JSON body: {}", provider, e))
    })
}

/// Parse the JSON document a model produced.
///
/// Models sometimes wrap JSON in a markdown fence even when asked not to;
/// one surrounding fence is stripped before parsing.
pub fn parse_model_json(text: &str) -> Result<JsonValue> {
    let trimmed = strip_code_fence(text.trim());
    if trimmed.is_empty() {
        return Err(Error::InvalidResponse("model returned empty text".to_string()));
    }
    serde_json::from_str(trimmed)
        .map_err(|e| Error::InvalidResponse(format!("model output is not valid JSON: {}", e)))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
