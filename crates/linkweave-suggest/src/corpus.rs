//! Corpus providers.
//!
//! A provider yields the published documents a request may link to, minus
//! the document being edited. The orchestrator takes one snapshot per request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use linkweave_core::{CandidateDocument, CorpusProvider, DocumentId, Result};

/// Publication status eligible for linking.
pub const PUBLISHED: &str = "publish";

fn default_status() -> String {
    PUBLISHED.to_string()
}

/// A corpus record as stored by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub id: DocumentId,
    pub title: String,
    pub url: String,
    #[serde(default = "default_status")]
    pub status: String,
}

impl CorpusEntry {
    pub fn is_published(&self) -> bool {
        self.status == PUBLISHED
    }
}

impl From<CandidateDocument> for CorpusEntry {
    fn from(doc: CandidateDocument) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            url: doc.url,
            status: default_status(),
        }
    }
}

/// Published entries other than `exclude_id`, first occurrence of each id.
fn eligible(entries: &[CorpusEntry], exclude_id: &DocumentId) -> Vec<CandidateDocument> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|e| e.is_published() && &e.id != exclude_id)
        .filter(|e| seen.insert(e.id.clone()))
        .map(|e| CandidateDocument {
            id: e.id.clone(),
            title: e.title.clone(),
            url: e.url.clone(),
        })
        .collect()
}

/// Corpus held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    entries: Vec<CorpusEntry>,
}

impl InMemoryCorpus {
    /// All documents are treated as published.
    pub fn new(documents: Vec<CandidateDocument>) -> Self {
        Self {
            entries: documents.into_iter().map(CorpusEntry::from).collect(),
        }
    }

    pub fn from_entries(entries: Vec<CorpusEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CorpusProvider for InMemoryCorpus {
    async fn candidates(&self, exclude_id: &DocumentId) -> Result<Vec<CandidateDocument>> {
        Ok(eligible(&self.entries, exclude_id))
    }
}

/// Corpus read from a JSON array file on every snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileCorpus {
    path: PathBuf,
}

impl JsonFileCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CorpusProvider for JsonFileCorpus {
    async fn candidates(&self, exclude_id: &DocumentId) -> Result<Vec<CandidateDocument>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let entries: Vec<CorpusEntry> = serde_json::from_str(&content)?;
        let candidates = eligible(&entries, exclude_id);
        debug!(
            path = %self.path.display(),
            total = entries.len(),
            candidate_count = candidates.len(),
            "Loaded corpus file"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkweave_core::Error;
    use std::io::Write;

    #[tokio::test]
    async fn test_in_memory_excludes_current_document() {
        let corpus = InMemoryCorpus::new(vec![
            CandidateDocument::new(1i64, "One", "/1"),
            CandidateDocument::new(2i64, "Two", "/2"),
        ]);
        let docs = corpus.candidates(&DocumentId::new("1")).await.unwrap();
        assert_eq!(docs, vec![CandidateDocument::new(2i64, "Two", "/2")]);
    }

    #[tokio::test]
    async fn test_unpublished_and_repeated_ids_filtered() {
        let corpus = InMemoryCorpus::from_entries(vec![
            CorpusEntry {
                id: 1i64.into(),
                title: "Draft".into(),
                url: "/d".into(),
                status: "draft".into(),
            },
            CandidateDocument::new(2i64, "Two", "/2").into(),
            CandidateDocument::new("2", "Two again", "/2b").into(),
        ]);
        let docs = corpus.candidates(&DocumentId::new("9")).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "Two");
    }

    #[tokio::test]
    async fn test_json_file_corpus() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": 1, "title": "One", "url": "/1"}},
                {{"id": "2", "title": "Two", "url": "/2", "status": "publish"}},
                {{"id": 3, "title": "Three", "url": "/3", "status": "private"}}
            ]"#
        )
        .unwrap();

        let corpus = JsonFileCorpus::new(file.path());
        let docs = corpus.candidates(&DocumentId::from(1i64)).await.unwrap();
        assert_eq!(docs, vec![CandidateDocument::new(2i64, "Two", "/2")]);
    }

    #[tokio::test]
    async fn test_json_file_corpus_errors() {
        let missing = JsonFileCorpus::new("/nonexistent/linkweave/corpus.json");
        assert!(matches!(
            missing.candidates(&DocumentId::new("1")).await,
            Err(Error::Io(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"not\": \"an array\"}}").unwrap();
        let malformed = JsonFileCorpus::new(file.path());
        assert!(matches!(
            malformed.candidates(&DocumentId::new("1")).await,
            Err(Error::Serialization(_))
        ));
    }
}
