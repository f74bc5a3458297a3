//! Centralized default constants for linkweave.
//!
//! Shared limits and timeouts live here so the backends, the joiner and the
//! tests agree on them.

// =============================================================================
// SUGGESTIONS
// =============================================================================

/// Maximum suggestions the prompt asks the LLM for, in either mode.
pub const MAX_LLM_SUGGESTIONS: usize = 5;

/// Minimum words in an extracted anchor phrase.
pub const ANCHOR_MIN_WORDS: usize = 4;

/// Maximum words in an extracted anchor phrase.
pub const ANCHOR_MAX_WORDS: usize = 6;

// =============================================================================
// RAG
// =============================================================================

/// Maximum RAG sources returned for one query.
pub const MAX_RAG_SOURCES: usize = 5;

/// Snippet length in characters for RAG sources.
pub const SNIPPET_LENGTH: usize = 200;

/// `user_type` sent with every RAG chat message.
pub const RAG_USER_TYPE: &str = "general";

/// Client address reported to the RAG service when none is configured.
pub const RAG_USER_IP: &str = "127.0.0.1";

// =============================================================================
// TIMEOUTS
// =============================================================================

/// Timeout for LLM generation calls (seconds).
pub const LLM_TIMEOUT_SECS: u64 = 60;

/// Timeout for acquiring a RAG conversation id (seconds).
pub const RAG_HANDSHAKE_TIMEOUT_SECS: u64 = 15;

/// Timeout for the RAG chat call (seconds).
pub const RAG_CHAT_TIMEOUT_SECS: u64 = 60;

/// Calls slower than this are logged as slow (milliseconds).
pub const SLOW_CALL_MS: u64 = 30_000;

// =============================================================================
// PROVIDERS
// =============================================================================

/// Gemini generation endpoint used when none is configured.
pub const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// OpenAI-compatible base URL used when none is configured.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible model used when none is configured.
pub const OPENAI_MODEL: &str = "gpt-4o-mini";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_bounds_are_ordered() {
        assert!(ANCHOR_MIN_WORDS <= ANCHOR_MAX_WORDS);
    }

    #[test]
    fn test_handshake_shorter_than_chat() {
        assert!(RAG_HANDSHAKE_TIMEOUT_SECS < RAG_CHAT_TIMEOUT_SECS);
    }
}
