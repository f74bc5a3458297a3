//! # linkweave-suggest
//!
//! Suggestion orchestration for linkweave.
//!
//! This crate ties the provider backends from `linkweave-inference` to a
//! corpus of linkable documents:
//! - [`corpus`]: corpus providers (in-memory and JSON file)
//! - [`joiner`]: validation of raw LLM output against the corpus snapshot
//! - [`orchestrator`]: request flow across the LLM and RAG paths

pub mod corpus;
pub mod joiner;
pub mod orchestrator;

pub use corpus::{CorpusEntry, InMemoryCorpus, JsonFileCorpus};
pub use orchestrator::{Orchestrator, RagOutcome, SettledPath, SuggestionOutcome};

// Re-export core types
pub use linkweave_core::*;
