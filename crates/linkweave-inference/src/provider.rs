//! Active LLM backend selection.
//!
//! [`LlmBackend`] is built once per request from a [`ProviderConfig`]
//! snapshot; every call dispatches through a single match.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::debug;

use linkweave_core::{Result, SuggestionBackend};

use crate::config::{ProviderConfig, ProviderKind};
use crate::gemini::GeminiBackend;
use crate::openai::OpenAICompatibleBackend;

/// One concrete LLM backend.
pub enum LlmBackend {
    Gemini(GeminiBackend),
    OpenAiCompatible(OpenAICompatibleBackend),
}

impl LlmBackend {
    /// Build the backend matching the config variant.
    pub fn from_config(config: ProviderConfig) -> Result<Self> {
        debug!(provider = %config.kind(), "Selecting LLM backend");
        match config {
            ProviderConfig::Gemini(cfg) => Ok(Self::Gemini(GeminiBackend::new(cfg)?)),
            ProviderConfig::OpenAiCompatible(cfg) => {
                Ok(Self::OpenAiCompatible(OpenAICompatibleBackend::new(cfg)?))
            }
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Gemini(_) => ProviderKind::Gemini,
            Self::OpenAiCompatible(_) => ProviderKind::OpenAiCompatible,
        }
    }

    fn inner(&self) -> &dyn SuggestionBackend {
        match self {
            Self::Gemini(backend) => backend,
            Self::OpenAiCompatible(backend) => backend,
        }
    }
}

#[async_trait]
impl SuggestionBackend for LlmBackend {
    async fn get_suggestions(&self, prompt: &str) -> Result<JsonValue> {
        self.inner().get_suggestions(prompt).await
    }

    fn provider_name(&self) -> &str {
        self.inner().provider_name()
    }
}
