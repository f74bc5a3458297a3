//! Gemini structured-output backend.
//!
//! Sends the prompt as the only user turn and asks the API to constrain the
//! reply to `application/json`, so the generated text is the JSON document
//! itself with no markdown around it.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use linkweave_core::defaults::{LLM_TIMEOUT_SECS, SLOW_CALL_MS};
use linkweave_core::{Error, Result, SuggestionBackend};

use crate::config::GeminiConfig;
use crate::http::{build_client, check_status, describe, parse_model_json, send_error};

const PROVIDER: &str = "gemini";

/// Gemini backend.
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a new Gemini backend. Credentials are checked per call.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        info!("Initializing Gemini backend: endpoint={}", config.endpoint);
        Ok(Self {
            client: build_client()?,
            config,
        })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn require_config(&self) -> Result<(&str, &str)> {
        let api_key = self.config.api_key.trim();
        if api_key.is_empty() {
            return Err(Error::ConfigMissing("Gemini API key is not set".to_string()));
        }
        let endpoint = self.config.endpoint.trim();
        if endpoint.is_empty() {
            return Err(Error::ConfigMissing(
                "Gemini endpoint is not set".to_string(),
            ));
        }
        Ok((api_key, endpoint))
    }
}

#[async_trait]
impl SuggestionBackend for GeminiBackend {
    #[instrument(skip(self, prompt), fields(subsystem = "inference", component = "gemini", op = "get_suggestions", prompt_len = prompt.len()))]
    async fn get_suggestions(&self, prompt: &str) -> Result<JsonValue> {
        let (api_key, endpoint) = self.require_config()?;
        let start = Instant::now();

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(endpoint)
            .query(&[("key", api_key)])
            .timeout(Duration::from_secs(LLM_TIMEOUT_SECS))
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, LLM_TIMEOUT_SECS, e))?;

        let response = check_status(PROVIDER, response).await?;

        let result: GenerateContentResponse = response.json().await.map_err(|e| {
            Error::InvalidResponse(format!("Failed to parse Gemini response: {}", describe(e)))
        })?;

        let text = result.first_text().ok_or_else(|| {
            Error::InvalidResponse(
                "Gemini response has no candidates[0].content.parts[0].text".to_string(),
            )
        })?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = text.len(),
            duration_ms = elapsed,
            "Generation complete"
        );
        if elapsed > SLOW_CALL_MS {
            warn!(
                duration_ms = elapsed,
                prompt_len = prompt.len(),
                slow = true,
                "Slow generation operation"
            );
        }

        parse_model_json(text)
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}
