//! OpenAI-compatible suggestion backend.
//!
//! Works with any endpoint that implements `/chat/completions`, including:
//!
//! - OpenAI cloud API
//! - Ollama (in OpenAI compatibility mode)
//! - vLLM
//! - LM Studio
//! - OpenRouter
//!
//! # Example
//!
//! ```rust,no_run
//! use linkweave_core::SuggestionBackend;
//! use linkweave_inference::config::OpenAiCompatibleConfig;
//! use linkweave_inference::openai::OpenAICompatibleBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = OpenAiCompatibleConfig {
//!         base_url: "http://localhost:11434/v1".to_string(), // Ollama
//!         model: "llama3".to_string(),
//!         api_key: None, // Not needed for local
//!     };
//!     let backend = OpenAICompatibleBackend::new(config).unwrap();
//!     let json = backend.get_suggestions("Return {\"suggestions\": []}").await.unwrap();
//!     println!("{}", json);
//! }
//! ```

mod backend;
mod types;

pub use backend::OpenAICompatibleBackend;
pub use types::*;
