//! RAG backend implementation.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, trace, warn};

use linkweave_core::defaults::{
    MAX_RAG_SOURCES, RAG_CHAT_TIMEOUT_SECS, RAG_HANDSHAKE_TIMEOUT_SECS, RAG_USER_TYPE,
    SLOW_CALL_MS, SNIPPET_LENGTH,
};
use linkweave_core::{Error, RagSource, Result, SourceBackend};

use super::types::*;
use crate::config::RagConfig;
use crate::http::{build_client, check_status, read_json, send_error};

const PROVIDER: &str = "rag";

/// Knowledge-base chat backend.
pub struct RagBackend {
    client: Client,
    config: RagConfig,
}

impl RagBackend {
    pub fn new(config: RagConfig) -> Result<Self> {
        info!(
            "Initializing RAG backend: url={}",
            config.base_url().unwrap_or("(disabled)")
        );
        Ok(Self {
            client: build_client()?,
            config,
        })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    fn base_url(&self) -> Result<&str> {
        self.config
            .base_url()
            .map(|url| url.trim_end_matches('/'))
            .ok_or_else(|| Error::ConfigMissing("RAG base URL is not set".to_string()))
    }

    /// Step 1: open a conversation and return its handle.
    async fn open_conversation(&self, base_url: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/conversation/get_id", base_url))
            .timeout(Duration::from_secs(RAG_HANDSHAKE_TIMEOUT_SECS))
            .json(&ConversationRequest::default())
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, RAG_HANDSHAKE_TIMEOUT_SECS, e))?;

        let response = check_status(PROVIDER, response).await?;
        let body = read_json(PROVIDER, response).await?;
        let parsed: ConversationResponse = serde_json::from_value(body).map_err(|e| {
            Error::InvalidResponse(format!("Unexpected conversation response: {}", e))
        })?;

        parsed.handle().ok_or_else(|| {
            Error::InvalidResponse("RAG service returned no conversationId".to_string())
        })
    }

    /// Step 2: send the query on the conversation and return raw sources.
    async fn ask(&self, base_url: &str, conversation_id: &str, query: &str) -> Result<Vec<JsonValue>> {
        let url = chat_url(base_url, conversation_id)?;
        let body = ChatRequest {
            user_ip: &self.config.user_ip,
            message: query,
            user_type: RAG_USER_TYPE,
        };

        let response = self
            .client
            .post(url)
            .timeout(Duration::from_secs(RAG_CHAT_TIMEOUT_SECS))
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, RAG_CHAT_TIMEOUT_SECS, e))?;

        let response = check_status(PROVIDER, response).await?;
        let body = read_json(PROVIDER, response).await?;
        let parsed: ChatResponse = serde_json::from_value(body)
            .map_err(|e| Error::InvalidResponse(format!("Unexpected chat response: {}", e)))?;

        Ok(parsed.sources.unwrap_or_default())
    }
}

/// `{base}/api/chat/{id}` with the id as one escaped path segment.
fn chat_url(base_url: &str, conversation_id: &str) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/api/chat", base_url))
        .map_err(|e| Error::Config(format!("Invalid RAG base URL {}: {}", base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::Config(format!("RAG base URL cannot hold a path: {}", base_url)))?
        .push(conversation_id);
    Ok(url)
}

/// Shape provider sources into [`RagSource`]s.
///
/// Keeps provider order, skips entries without a URL, drops repeats of the
/// same plain URL, prefers the deep link for the returned URL, truncates
/// snippets and stops at [`MAX_RAG_SOURCES`].
pub fn normalize_sources(raw: &[JsonValue]) -> Vec<RagSource> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut sources = Vec::new();

    for entry in raw {
        if sources.len() >= MAX_RAG_SOURCES {
            break;
        }
        let Some(source) = RawSource::from_json(entry) else {
            trace!("Skipping non-object source entry");
            continue;
        };
        let Some(plain_url) = source.url.clone() else {
            trace!("Skipping source without url");
            continue;
        };
        if !seen.insert(plain_url.clone()) {
            trace!(url = %plain_url, "Skipping duplicate source");
            continue;
        }

        let title = source
            .title
            .or(source.name)
            .unwrap_or_else(|| plain_url.clone());
        let url = source.deep_link_url.unwrap_or(plain_url);
        let snippet = truncate_chars(source.text.as_deref().unwrap_or("").trim(), SNIPPET_LENGTH);

        sources.push(RagSource {
            title,
            url,
            snippet,
        });
    }

    sources
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[async_trait]
impl SourceBackend for RagBackend {
    #[instrument(skip(self, query), fields(subsystem = "rag", component = "rag", op = "get_sources", query_len = query.len()))]
    async fn get_sources(&self, query: &str) -> Result<Vec<RagSource>> {
        let base_url = self.base_url()?;
        let start = Instant::now();

        let conversation_id = self.open_conversation(base_url).await?;
        debug!(conversation_id = %conversation_id, "Opened RAG conversation");

        let raw = self.ask(base_url, &conversation_id, query).await?;
        let sources = normalize_sources(&raw);

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            raw_count = raw.len(),
            result_count = sources.len(),
            duration_ms = elapsed,
            "RAG lookup complete"
        );
        if elapsed > SLOW_CALL_MS {
            warn!(duration_ms = elapsed, slow = true, "Slow RAG lookup");
        }
        Ok(sources)
    }
}
