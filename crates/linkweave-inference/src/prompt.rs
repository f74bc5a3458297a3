//! Prompt construction for link suggestions.
//!
//! Both prompts embed the candidate list as JSON and demand a
//! `{"suggestions": [...]}` envelope, with `{"suggestions": []}` as the exact
//! fallback. Building a prompt is pure: the same request and candidates always
//! produce the same string.

use serde_json::{json, Value as JsonValue};

use linkweave_core::defaults::{ANCHOR_MAX_WORDS, ANCHOR_MIN_WORDS, MAX_LLM_SUGGESTIONS};
use linkweave_core::{CandidateDocument, SuggestionRequest};

/// Fallback envelope the model must emit when nothing matches.
pub const EMPTY_ENVELOPE: &str = r#"{"suggestions": []}"#;

/// Build the prompt for a request.
pub fn build_prompt(request: &SuggestionRequest, candidates: &[CandidateDocument]) -> String {
    match request {
        SuggestionRequest::WholeDocumentScan { draft_text, .. } => {
            whole_document_prompt(draft_text, candidates)
        }
        SuggestionRequest::PhraseLookup { anchor_text, .. } => {
            phrase_prompt(anchor_text.trim(), candidates)
        }
    }
}

/// Generates the whole-document scan prompt.
///
/// # Arguments
/// * `draft_text` - Full draft, embedded verbatim
/// * `candidates` - Documents the model may link to
pub fn whole_document_prompt(draft_text: &str, candidates: &[CandidateDocument]) -> String {
    format!(
        r#"You are an editorial assistant that adds internal links to articles.

Read the DRAFT below and find phrases that should link to one of the CANDIDATE DOCUMENTS.

CANDIDATE DOCUMENTS (JSON):
{candidates}

DRAFT:
"""
{draft}
"""

RULES:
1. The anchor text MUST appear verbatim in the DRAFT, character for character. Never paraphrase, reorder, or fix typos.
2. The anchor text MUST be between {min} and {max} words long, inclusive.
3. The anchor text MUST be a natural, self-contained phrase. Never cut a phrase in the middle or start it with a dangling word.
4. Return at most {max_suggestions} suggestions. Pair each anchor text with exactly ONE best-matching candidate document.
5. NEVER use a candidate document's title as anchor text unless that exact string also appears verbatim in the DRAFT.
6. Only use "id" values from the CANDIDATE DOCUMENTS list.

Respond with a single JSON object and nothing else, in exactly this shape:
{{"suggestions": [{{"anchor_text": "<phrase copied from the draft>", "post_id_to_link": <candidate id>, "reasoning": "<one sentence>"}}]}}

If no phrase satisfies every rule, respond with exactly:
{empty}"#,
        candidates = candidate_json(candidates),
        draft = draft_text,
        min = ANCHOR_MIN_WORDS,
        max = ANCHOR_MAX_WORDS,
        max_suggestions = MAX_LLM_SUGGESTIONS,
        empty = EMPTY_ENVELOPE,
    )
}

/// Generates the single-phrase lookup prompt.
pub fn phrase_prompt(anchor_text: &str, candidates: &[CandidateDocument]) -> String {
    format!(
        r#"You are an editorial assistant that picks link targets.

A writer selected the PHRASE below and wants to link it to one of the CANDIDATE DOCUMENTS.

CANDIDATE DOCUMENTS (JSON):
{candidates}

PHRASE:
"""
{anchor}
"""

RULES:
1. Return up to {max_suggestions} candidate documents that are relevant link targets for the PHRASE.
2. Order them from most relevant to least relevant.
3. Only use "id" values from the CANDIDATE DOCUMENTS list. Never invent documents.

Respond with a single JSON object and nothing else, in exactly this shape:
{{"suggestions": [{{"post_id_to_link": <candidate id>, "reasoning": "<one sentence>"}}]}}

If no candidate is relevant, respond with exactly:
{empty}"#,
        candidates = candidate_json(candidates),
        anchor = anchor_text,
        max_suggestions = MAX_LLM_SUGGESTIONS,
        empty = EMPTY_ENVELOPE,
    )
}

/// Pretty JSON array of `{id, title, url}` objects, in corpus order.
fn candidate_json(candidates: &[CandidateDocument]) -> String {
    let list: Vec<JsonValue> = candidates
        .iter()
        .map(|doc| json!({"id": doc.id, "title": doc.title, "url": doc.url}))
        .collect();
    format!("{:#}", JsonValue::Array(list))
}
