//! Knowledge-base RAG backend.
//!
//! Talks to a chat service that answers questions and reports the sources it
//! used. Each lookup opens a fresh conversation and sends one message.

mod backend;
mod types;

pub use backend::{normalize_sources, RagBackend};
pub use types::*;
