//! # linkweave-inference
//!
//! Provider backends for link suggestions.
//!
//! This crate provides:
//! - Prompt construction for whole-document scans and phrase lookups
//! - Gemini structured-output backend
//! - OpenAI-compatible chat-completions backend
//! - Knowledge-base RAG backend (two-step conversation protocol)
//! - Persisted provider settings with per-backend credentials
//!
//! # Feature Flags
//!
//! - `mock`: Expose mock backends with call logs for downstream tests
//!
//! # Example
//!
//! ```rust,no_run
//! use linkweave_core::SuggestionBackend;
//! use linkweave_inference::{config::Settings, prompt, LlmBackend};
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = Settings::from_env();
//!     let backend = LlmBackend::from_config(settings.active_provider()).unwrap();
//!     let text = prompt::phrase_prompt("async runtimes", &[]);
//!     let json = backend.get_suggestions(&text).await.unwrap();
//!     println!("{}", json);
//! }
//! ```

pub mod config;
pub mod gemini;
mod http;
pub mod openai;
pub mod prompt;
pub mod provider;
pub mod rag;

// Mock backends for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::{
    FileSettingsStore, GeminiConfig, MemorySettingsStore, OpenAiCompatibleConfig, ProviderConfig,
    ProviderKind, RagConfig, Settings, SettingsStore,
};
pub use gemini::GeminiBackend;
pub use http::parse_model_json;
pub use openai::OpenAICompatibleBackend;
pub use prompt::build_prompt;
pub use provider::LlmBackend;
pub use rag::RagBackend;
