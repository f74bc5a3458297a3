//! Structured logging field names for linkweave.
//!
//! All crates use these constants for consistent structured logging fields.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | A request path failed in a way the operator must fix (bad config) |
//! | WARN  | Provider failure, slow call, dropped provider entries |
//! | INFO  | Lifecycle events, request completions |
//! | DEBUG | Decision points, payload sizes, provider choice |
//! | TRACE | Per-entry iteration in the joiner |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "inference", "rag", "suggest", "config", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "gemini", "openai_compatible", "orchestrator", "joiner"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "get_suggestions", "get_sources", "suggest"
pub const OPERATION: &str = "op";

/// Suggestion mode ("whole_document", "phrase").
pub const MODE: &str = "mode";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a path.
pub const RESULT_COUNT: &str = "result_count";

/// Number of candidate documents in the corpus snapshot.
pub const CANDIDATE_COUNT: &str = "candidate_count";

/// Number of provider entries dropped during validation.
pub const DROPPED_COUNT: &str = "dropped_count";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// HTTP status returned by a provider.
pub const STATUS: &str = "status";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error kind when an operation fails.
pub const ERROR_KIND: &str = "error_kind";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
