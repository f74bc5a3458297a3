//! Suggestion orchestration.
//!
//! One request runs the LLM path and (for phrase lookups with a configured
//! RAG backend) the RAG path. The two paths are independent: neither waits
//! on, cancels, or fails the other. A scan snapshots the corpus before any
//! path starts; a lookup's LLM path takes its own snapshot.

use futures::future::{self, BoxFuture};
use futures::stream::{BoxStream, FuturesUnordered};
use futures::{FutureExt, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, field, info, instrument, warn, Span};

use linkweave_core::defaults::SLOW_CALL_MS;
use linkweave_core::{
    logging, CandidateDocument, CorpusProvider, DocumentId, Error, LinkSuggestion, RagSource,
    Result, SourceBackend, SuggestionBackend, SuggestionMode, SuggestionRequest,
};
use linkweave_inference::{build_prompt, LlmBackend, RagBackend, Settings};

use crate::joiner;

/// State of the RAG path for one request.
#[derive(Debug)]
pub enum RagOutcome {
    /// Whole-document scans and requests without a RAG backend.
    NotApplicable,
    Settled(Result<Vec<RagSource>>),
}

impl RagOutcome {
    pub fn is_applicable(&self) -> bool {
        matches!(self, Self::Settled(_))
    }
}

/// Both paths of a request, each settled on its own.
#[derive(Debug)]
pub struct SuggestionOutcome {
    pub llm: Result<Vec<LinkSuggestion>>,
    pub rag: RagOutcome,
}

/// One path finishing, in settlement order.
#[derive(Debug)]
pub enum SettledPath {
    Llm(Result<Vec<LinkSuggestion>>),
    Rag(Result<Vec<RagSource>>),
}

struct Plan<'a> {
    llm: BoxFuture<'a, Result<Vec<LinkSuggestion>>>,
    rag: Option<BoxFuture<'a, Result<Vec<RagSource>>>>,
}

/// Runs suggestion requests against one LLM backend, an optional RAG
/// backend, and a corpus provider.
#[derive(Clone)]
pub struct Orchestrator {
    llm: Arc<dyn SuggestionBackend>,
    rag: Option<Arc<dyn SourceBackend>>,
    corpus: Arc<dyn CorpusProvider>,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn SuggestionBackend>, corpus: Arc<dyn CorpusProvider>) -> Self {
        Self {
            llm,
            rag: None,
            corpus,
        }
    }

    pub fn with_rag(mut self, rag: Arc<dyn SourceBackend>) -> Self {
        self.rag = Some(rag);
        self
    }

    /// Build backends from a settings snapshot.
    ///
    /// Later changes to the stored settings do not affect this instance.
    pub fn from_settings(settings: &Settings, corpus: Arc<dyn CorpusProvider>) -> Result<Self> {
        let llm = LlmBackend::from_config(settings.active_provider())?;
        let mut orchestrator = Self::new(Arc::new(llm), corpus);
        if settings.rag.is_enabled() {
            orchestrator = orchestrator.with_rag(Arc::new(RagBackend::new(settings.rag.clone())?));
        } else {
            debug!("RAG backend not configured, phrase lookups will skip the RAG path");
        }
        Ok(orchestrator)
    }

    pub fn provider_name(&self) -> &str {
        self.llm.provider_name()
    }

    pub fn has_rag(&self) -> bool {
        self.rag.is_some()
    }

    /// Run a request and wait for every applicable path.
    ///
    /// Returns `Err` only for precondition failures: empty input, or for a
    /// scan an empty or unreachable corpus. Provider failures, and a failed
    /// corpus fetch during a lookup, are reported per path.
    #[instrument(
        skip(self, request),
        fields(subsystem = "suggest", component = "orchestrator", op = "suggest",
               mode = %request.mode(), candidate_count = field::Empty)
    )]
    pub async fn suggest(&self, request: &SuggestionRequest) -> Result<SuggestionOutcome> {
        let plan = self.plan(request).await?;
        let outcome = match plan.rag {
            Some(rag) => {
                let (llm, rag) = future::join(plan.llm, rag).await;
                SuggestionOutcome {
                    llm,
                    rag: RagOutcome::Settled(rag),
                }
            }
            None => SuggestionOutcome {
                llm: plan.llm.await,
                rag: RagOutcome::NotApplicable,
            },
        };
        Ok(outcome)
    }

    /// Run a request and yield each path as soon as it settles.
    ///
    /// The stream ends after the last applicable path.
    #[instrument(
        skip(self, request),
        fields(subsystem = "suggest", component = "orchestrator", op = "suggest_settled",
               mode = %request.mode(), candidate_count = field::Empty)
    )]
    pub async fn suggest_settled(
        &self,
        request: &SuggestionRequest,
    ) -> Result<BoxStream<'_, SettledPath>> {
        let plan = self.plan(request).await?;
        let pending = FuturesUnordered::new();
        pending.push(plan.llm.map(SettledPath::Llm).boxed());
        if let Some(rag) = plan.rag {
            pending.push(rag.map(SettledPath::Rag).boxed());
        }
        Ok(pending.boxed())
    }

    /// Whole-document scan. The LLM path is the only path, so its failure
    /// is the call's failure.
    pub async fn scan_document(
        &self,
        draft_text: &str,
        exclude_id: impl Into<DocumentId>,
    ) -> Result<Vec<LinkSuggestion>> {
        let request = SuggestionRequest::whole_document(draft_text, exclude_id)?;
        self.suggest(&request).await?.llm
    }

    /// Phrase lookup across both paths.
    pub async fn lookup_phrase(
        &self,
        anchor_text: &str,
        exclude_id: impl Into<DocumentId>,
    ) -> Result<SuggestionOutcome> {
        let request = SuggestionRequest::phrase_lookup(anchor_text, exclude_id)?;
        self.suggest(&request).await
    }

    async fn plan(&self, request: &SuggestionRequest) -> Result<Plan<'_>> {
        request.validate()?;

        let llm = match request.mode() {
            SuggestionMode::WholeDocument => {
                let candidates = self.snapshot(request.exclude_id()).await?;
                if candidates.is_empty() {
                    return Err(Error::EmptyCorpus);
                }
                self.run_llm(request.clone(), Some(candidates)).boxed()
            }
            // Fetched inside the LLM path so the RAG path never waits on the store.
            SuggestionMode::Phrase => self.run_llm(request.clone(), None).boxed(),
        };
        let rag = match (request.mode(), &self.rag) {
            (SuggestionMode::Phrase, Some(backend)) => {
                Some(Self::run_rag(Arc::clone(backend), request.text().to_string()).boxed())
            }
            _ => None,
        };

        Ok(Plan { llm, rag })
    }

    /// Linkable documents other than the one being edited.
    async fn snapshot(&self, exclude_id: &DocumentId) -> Result<Vec<CandidateDocument>> {
        let candidates: Vec<CandidateDocument> = self
            .corpus
            .candidates(exclude_id)
            .await?
            .into_iter()
            .filter(|doc| &doc.id != exclude_id)
            .collect();
        Span::current().record(logging::CANDIDATE_COUNT, candidates.len());
        Ok(candidates)
    }

    #[instrument(
        skip_all,
        fields(subsystem = "suggest", component = "orchestrator", op = "llm_path",
               provider = %self.llm.provider_name(), candidate_count = field::Empty,
               result_count = field::Empty, duration_ms = field::Empty)
    )]
    async fn run_llm(
        &self,
        request: SuggestionRequest,
        candidates: Option<Vec<CandidateDocument>>,
    ) -> Result<Vec<LinkSuggestion>> {
        let start = Instant::now();
        let result = self.llm_path(&request, candidates).await;
        record_settled("llm", &result, start);
        result
    }

    async fn llm_path(
        &self,
        request: &SuggestionRequest,
        candidates: Option<Vec<CandidateDocument>>,
    ) -> Result<Vec<LinkSuggestion>> {
        let candidates = match candidates {
            Some(candidates) => candidates,
            None => self.snapshot(request.exclude_id()).await?,
        };
        if candidates.is_empty() {
            debug!("No candidates for phrase lookup, skipping LLM call");
            return Ok(Vec::new());
        }

        let prompt = build_prompt(request, &candidates);
        let raw = self.llm.get_suggestions(&prompt).await?;
        joiner::join(request, &raw, &candidates)
    }

    #[instrument(
        skip_all,
        fields(subsystem = "suggest", component = "orchestrator", op = "rag_path",
               result_count = field::Empty, duration_ms = field::Empty)
    )]
    async fn run_rag(backend: Arc<dyn SourceBackend>, query: String) -> Result<Vec<RagSource>> {
        let start = Instant::now();
        let result = backend.get_sources(&query).await;
        record_settled("rag", &result, start);
        result
    }
}

fn record_settled<T>(path: &'static str, result: &Result<Vec<T>>, start: Instant) {
    let duration_ms = start.elapsed().as_millis() as u64;
    let span = Span::current();
    span.record(logging::DURATION_MS, duration_ms);

    match result {
        Ok(items) => {
            span.record(logging::RESULT_COUNT, items.len());
            if duration_ms > SLOW_CALL_MS {
                warn!(path, duration_ms, slow = true, "Path settled slowly");
            } else {
                info!(path, result_count = items.len(), duration_ms, "Path settled");
            }
        }
        Err(e) => {
            warn!(
                path,
                error_kind = %e.kind(),
                error = %e,
                duration_ms,
                "Path failed"
            );
        }
    }
}
