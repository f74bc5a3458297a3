//! OpenAI-compatible backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use linkweave_core::defaults::{LLM_TIMEOUT_SECS, SLOW_CALL_MS};
use linkweave_core::{Error, Result, SuggestionBackend};

use super::types::*;
use crate::config::OpenAiCompatibleConfig;
use crate::http::{build_client, check_status, describe, parse_model_json, send_error};

const PROVIDER: &str = "openai_compatible";

/// OpenAI-compatible suggestion backend.
pub struct OpenAICompatibleBackend {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAICompatibleBackend {
    /// Create a new backend. Base URL and model are checked per call.
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self> {
        info!(
            "Initializing OpenAI-compatible backend: url={}, model={}",
            config.base_url, config.model
        );
        Ok(Self {
            client: build_client()?,
            config,
        })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAiCompatibleConfig {
        &self.config
    }

    /// Build a request with authentication if configured.
    fn build_request(&self, base_url: &str, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(api_key) = self.api_key() {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req.header("Content-Type", "application/json")
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    fn require_config(&self) -> Result<(&str, &str)> {
        let base_url = self.config.base_url.trim();
        if base_url.is_empty() {
            return Err(Error::ConfigMissing(
                "OpenAI-compatible base URL is not set".to_string(),
            ));
        }
        let model = self.config.model.trim();
        if model.is_empty() {
            return Err(Error::ConfigMissing(
                "OpenAI-compatible model is not set".to_string(),
            ));
        }
        Ok((base_url, model))
    }
}

#[async_trait]
impl SuggestionBackend for OpenAICompatibleBackend {
    #[instrument(skip(self, prompt), fields(subsystem = "inference", component = "openai_compatible", op = "get_suggestions", model = %self.config.model, prompt_len = prompt.len()))]
    async fn get_suggestions(&self, prompt: &str) -> Result<JsonValue> {
        let (base_url, model) = self.require_config()?;
        let start = Instant::now();

        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage::user(prompt)],
            response_format: ResponseFormat::json_object(),
        };

        let response = self
            .build_request(base_url, "/chat/completions")
            .timeout(Duration::from_secs(LLM_TIMEOUT_SECS))
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, LLM_TIMEOUT_SECS, e))?;

        let response = check_status(PROVIDER, response).await?;

        let result: ChatCompletionResponse = response.json().await.map_err(|e| {
            Error::InvalidResponse(format!(
                "Failed to parse completions response: {}",
                describe(e)
            ))
        })?;

        let content = result.first_content().ok_or_else(|| {
            Error::InvalidResponse(
                "Completions response has no choices[0].message.content".to_string(),
            )
        })?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = content.len(),
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

        parse_model_json(content)
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str, model: &str) -> OpenAiCompatibleConfig {
        OpenAiCompatibleConfig {
            base_url: base_url.to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    #[tokio::test]
    async fn test_missing_base_url_fails_fast() {
        let backend = OpenAICompatibleBackend::new(config("", "llama3")).unwrap();
        let err = backend.get_suggestions("prompt").await.unwrap_err();
        assert!(matches!(err, Error::ConfigMissing(ref m) if m.contains("base URL")));
    }

    #[tokio::test]
    async fn test_missing_model_fails_fast() {
        let backend =
            OpenAICompatibleBackend::new(config("http://localhost:1/v1", "  ")).unwrap();
        let err = backend.get_suggestions("prompt").await.unwrap_err();
        assert!(matches!(err, Error::ConfigMissing(ref m) if m.contains("model")));
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let mut cfg = config("http://localhost/v1", "m");
        cfg.api_key = Some("  ".to_string());
        let backend = OpenAICompatibleBackend::new(cfg).unwrap();
        assert_eq!(backend.api_key(), None);
        assert_eq!(backend.provider_name(), "openai_compatible");
    }
}
