//! Core data models for linkweave.
//!
//! Every type here is a request-scoped value: built at request entry,
//! never mutated while the request is in flight.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;

use crate::error::{Error, Result};

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Opaque document identifier held in canonical comparable form.
///
/// Providers echo ids back as numbers or numeral strings interchangeably, so
/// integral values collapse to their decimal form: `1`, `1.0`, `"1"` and
/// `" 1 "` are all the same id. Non-numeric ids are kept as trimmed text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    /// Build an id from free text, canonicalizing numerals.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(canonical_text(raw.as_ref()))
    }

    /// Coerce a JSON value into an id.
    ///
    /// Returns `None` for null, booleans, containers, blank strings, and
    /// non-integral numbers.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self(i.to_string()))
                } else if let Some(u) = n.as_u64() {
                    Some(Self(u.to_string()))
                } else {
                    n.as_f64().and_then(integral_text).map(Self)
                }
            }
            JsonValue::String(s) if !s.trim().is_empty() => Some(Self::new(s)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric view of the id, when it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

fn integral_text(f: f64) -> Option<String> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Some(format!("{}", f as i64))
    } else {
        None
    }
}

fn canonical_text(raw: &str) -> String {
    let trimmed = raw.trim();
    // Only "12" and "12.0" spell the integer 12; "1e3" or "0x10" stay text.
    let whole = match trimmed.split_once('.') {
        Some((whole, frac)) if !frac.is_empty() && frac.bytes().all(|b| b == b'0') => whole,
        _ => trimmed,
    };
    match whole.parse::<i64>() {
        Ok(i) => i.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<i64> for DocumentId {
    fn from(i: i64) -> Self {
        Self(i.to_string())
    }
}

impl From<u64> for DocumentId {
    fn from(u: u64) -> Self {
        Self(u.to_string())
    }
}

impl From<i32> for DocumentId {
    fn from(i: i32) -> Self {
        Self(i.to_string())
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.as_i64() {
            Some(i) => serializer.serialize_i64(i),
            None => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        DocumentId::from_json(&value).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid document id: {}", value))
        })
    }
}

// =============================================================================
// CORPUS
// =============================================================================

/// A document eligible to be a link target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDocument {
    pub id: DocumentId,
    pub title: String,
    pub url: String,
}

impl CandidateDocument {
    pub fn new(id: impl Into<DocumentId>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Which suggestion strategy a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionMode {
    /// Scan the whole draft for anchor phrases.
    WholeDocument,
    /// Find targets for one fixed phrase.
    Phrase,
}

impl fmt::Display for SuggestionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WholeDocument => write!(f, "whole_document"),
            Self::Phrase => write!(f, "phrase"),
        }
    }
}

/// One suggestion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SuggestionRequest {
    WholeDocumentScan {
        draft_text: String,
        exclude_id: DocumentId,
    },
    PhraseLookup {
        anchor_text: String,
        exclude_id: DocumentId,
    },
}

impl SuggestionRequest {
    /// Build a whole-document scan, rejecting a blank draft.
    pub fn whole_document(
        draft_text: impl Into<String>,
        exclude_id: impl Into<DocumentId>,
    ) -> Result<Self> {
        let request = Self::WholeDocumentScan {
            draft_text: draft_text.into(),
            exclude_id: exclude_id.into(),
        };
        request.validate()?;
        Ok(request)
    }

    /// Build a phrase lookup. The anchor is trimmed and must not be blank.
    pub fn phrase_lookup(
        anchor_text: impl AsRef<str>,
        exclude_id: impl Into<DocumentId>,
    ) -> Result<Self> {
        let request = Self::PhraseLookup {
            anchor_text: anchor_text.as_ref().trim().to_string(),
            exclude_id: exclude_id.into(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn mode(&self) -> SuggestionMode {
        match self {
            Self::WholeDocumentScan { .. } => SuggestionMode::WholeDocument,
            Self::PhraseLookup { .. } => SuggestionMode::Phrase,
        }
    }

    pub fn exclude_id(&self) -> &DocumentId {
        match self {
            Self::WholeDocumentScan { exclude_id, .. } | Self::PhraseLookup { exclude_id, .. } => {
                exclude_id
            }
        }
    }

    /// The draft or the trimmed anchor, whichever the mode carries.
    pub fn text(&self) -> &str {
        match self {
            Self::WholeDocumentScan { draft_text, .. } => draft_text,
            Self::PhraseLookup { anchor_text, .. } => anchor_text.trim(),
        }
    }

    /// Check the text invariants without touching any provider.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::WholeDocumentScan { draft_text, .. } if draft_text.trim().is_empty() => {
                Err(Error::EmptyInput("draft text is empty".to_string()))
            }
            Self::PhraseLookup { anchor_text, .. } if anchor_text.trim().is_empty() => {
                Err(Error::EmptyInput("anchor text is empty".to_string()))
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// A normalized link suggestion pointing at a corpus document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSuggestion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_text: Option<String>,
    pub target_id: DocumentId,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// An external source snippet returned by the RAG provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagSource {
    pub title: String,
    /// Deep link when the provider sent one, plain URL otherwise.
    pub url: String,
    pub snippet: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_id_numeric_coercion() {
        assert_eq!(DocumentId::from(1i64), DocumentId::new("1"));
        assert_eq!(DocumentId::from(1i64), DocumentId::new(" 1 "));
        assert_eq!(DocumentId::from_json(&json!(1)), Some(DocumentId::from(1i64)));
        assert_eq!(DocumentId::from_json(&json!("1")), Some(DocumentId::from(1i64)));
        assert_eq!(DocumentId::from_json(&json!(1.0)), Some(DocumentId::from(1i64)));
        assert_eq!(DocumentId::new("1.0"), DocumentId::from(1i64));
        assert_eq!(DocumentId::new("-4.00"), DocumentId::from(-4i64));
    }

    #[test]
    fn test_document_id_other_numeric_spellings_stay_text() {
        for raw in ["1e3", "1E3", "1000e0", "1.", ".0", "1.5", "inf", "NaN"] {
            let id = DocumentId::new(raw);
            assert_eq!(id.as_str(), raw);
            assert_ne!(id, DocumentId::from(1000i64));
        }
        assert_eq!(DocumentId::from_json(&json!("1e3")).unwrap().as_str(), "1e3");
    }

    #[test]
    fn test_document_id_rejects_unusable_values() {
        assert_eq!(DocumentId::from_json(&json!(null)), None);
        assert_eq!(DocumentId::from_json(&json!(true)), None);
        assert_eq!(DocumentId::from_json(&json!("  ")), None);
        assert_eq!(DocumentId::from_json(&json!(1.5)), None);
        assert_eq!(DocumentId::from_json(&json!({"id": 1})), None);
    }

    #[test]
    fn test_document_id_opaque_text_kept() {
        let id = DocumentId::new(" post-abc ");
        assert_eq!(id.as_str(), "post-abc");
        assert_eq!(id.as_i64(), None);
    }

    #[test]
    fn test_document_id_serializes_numbers_as_numbers() {
        assert_eq!(serde_json::to_value(DocumentId::from(7i64)).unwrap(), json!(7));
        assert_eq!(
            serde_json::to_value(DocumentId::new("slug")).unwrap(),
            json!("slug")
        );
        let back: DocumentId = serde_json::from_value(json!("42")).unwrap();
        assert_eq!(back, DocumentId::from(42i64));
    }

    #[test]
    fn test_phrase_lookup_trims_anchor() {
        let req = SuggestionRequest::phrase_lookup("  rust async  ", 3i64).unwrap();
        assert_eq!(req.text(), "rust async");
        assert_eq!(req.mode(), SuggestionMode::Phrase);
        assert_eq!(req.exclude_id(), &DocumentId::from(3i64));
    }

    #[test]
    fn test_blank_inputs_rejected() {
        let err = SuggestionRequest::phrase_lookup("   \n", 1i64).unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
        let err = SuggestionRequest::whole_document("", 1i64).unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
    }

    #[test]
    fn test_request_serde_tagged() {
        let req = SuggestionRequest::whole_document("Some draft", 9i64).unwrap();
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["mode"], "whole_document_scan");
        assert_eq!(value["exclude_id"], 9);
    }

    #[test]
    fn test_link_suggestion_omits_empty_options() {
        let s = LinkSuggestion {
            anchor_text: None,
            target_id: DocumentId::from(1i64),
            title: "Guide".into(),
            url: "/x".into(),
            reasoning: None,
        };
        let value = serde_json::to_value(&s).unwrap();
        assert!(value.get("anchor_text").is_none());
        assert!(value.get("reasoning").is_none());
    }
}
