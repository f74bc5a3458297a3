//! Validation and corpus join for raw LLM output.
//!
//! The joiner only unwraps the provider's envelope and keeps entries that
//! resolve against the corpus snapshot. It never invents structure and never
//! re-ranks: surviving entries keep the provider's order.

use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};

use linkweave_core::{
    CandidateDocument, DocumentId, Error, LinkSuggestion, Result, SuggestionRequest,
};

/// Keys that may carry the target id, in lookup order.
const ID_FIELDS: &[&str] = &["post_id_to_link", "target_id", "targetId", "post_id", "id"];

/// Keys that may carry the anchor phrase, in lookup order.
const ANCHOR_FIELDS: &[&str] = &["anchor_text", "anchorText"];

/// Accept `{"suggestions": [...]}` or a bare array.
pub fn unwrap_entries(raw: &JsonValue) -> Result<&[JsonValue]> {
    match raw {
        JsonValue::Array(entries) => Ok(entries),
        JsonValue::Object(obj) => match obj.get("suggestions") {
            Some(JsonValue::Array(entries)) => Ok(entries),
            Some(_) => Err(Error::InvalidResponse(
                "\"suggestions\" is not an array".to_string(),
            )),
            None => Err(Error::InvalidResponse(
                "response object has no \"suggestions\" array".to_string(),
            )),
        },
        other => Err(Error::InvalidResponse(format!(
            "expected an array or a suggestions envelope, got {}",
            json_type(other)
        ))),
    }
}

/// Join raw provider output against the corpus snapshot.
///
/// Entries that are not objects, lack a resolvable id, point outside the
/// corpus, or (for whole-document scans) lack an anchor are dropped. Exact
/// repeats collapse onto their first occurrence.
pub fn join(
    request: &SuggestionRequest,
    raw: &JsonValue,
    candidates: &[CandidateDocument],
) -> Result<Vec<LinkSuggestion>> {
    let entries = unwrap_entries(raw)?;

    let mut by_id: HashMap<&DocumentId, &CandidateDocument> = HashMap::new();
    for doc in candidates {
        by_id.entry(&doc.id).or_insert(doc);
    }

    let mut seen: HashSet<(DocumentId, String)> = HashSet::new();
    let mut suggestions = Vec::with_capacity(entries.len());
    let mut dropped = 0usize;

    for (index, entry) in entries.iter().enumerate() {
        match resolve_entry(request, entry, &by_id) {
            Some(suggestion) => {
                let key = dedup_key(&suggestion);
                if seen.insert(key) {
                    suggestions.push(suggestion);
                } else {
                    trace!(index, "Dropping repeated suggestion");
                    dropped += 1;
                }
            }
            None => {
                trace!(index, entry = %entry, "Dropping unresolvable suggestion");
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        warn!(
            dropped_count = dropped,
            result_count = suggestions.len(),
            "Dropped provider suggestions that did not validate"
        );
    } else {
        debug!(result_count = suggestions.len(), "All provider suggestions resolved");
    }

    Ok(suggestions)
}

fn resolve_entry(
    request: &SuggestionRequest,
    entry: &JsonValue,
    by_id: &HashMap<&DocumentId, &CandidateDocument>,
) -> Option<LinkSuggestion> {
    let obj = entry.as_object()?;

    let target_id = ID_FIELDS
        .iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
        .and_then(DocumentId::from_json)?;
    if &target_id == request.exclude_id() {
        return None;
    }
    let doc = by_id.get(&target_id)?;

    let anchor_text = match request {
        SuggestionRequest::WholeDocumentScan { .. } => Some(
            ANCHOR_FIELDS
                .iter()
                .find_map(|key| non_blank_str(obj.get(*key)))?,
        ),
        SuggestionRequest::PhraseLookup { anchor_text, .. } => {
            Some(anchor_text.trim().to_string())
        }
    };

    Some(LinkSuggestion {
        anchor_text,
        target_id: doc.id.clone(),
        title: doc.title.clone(),
        url: doc.url.clone(),
        reasoning: non_blank_str(obj.get("reasoning")),
    })
}

fn non_blank_str(value: Option<&JsonValue>) -> Option<String> {
    value
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn dedup_key(suggestion: &LinkSuggestion) -> (DocumentId, String) {
    (
        suggestion.target_id.clone(),
        suggestion
            .anchor_text
            .as_deref()
            .unwrap_or_default()
            .to_lowercase(),
    )
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
