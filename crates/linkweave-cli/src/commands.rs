//! Subcommand implementations and JSON rendering.

use anyhow::Context;
use futures::StreamExt;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

use linkweave_core::{DocumentId, Error, SuggestionRequest};
use linkweave_inference::{FileSettingsStore, ProviderKind, SettingsStore};
use linkweave_suggest::{JsonFileCorpus, Orchestrator, SettledPath};

pub fn settings_store(path: Option<PathBuf>) -> FileSettingsStore {
    FileSettingsStore::new(path.unwrap_or_else(FileSettingsStore::default_path))
}

/// `{"kind", "message"}` for one error.
pub fn error_report(error: &Error) -> JsonValue {
    json!({
        "kind": error.kind(),
        "message": error.to_string(),
    })
}

/// JSON for one settled path.
pub fn path_report(settled: &SettledPath) -> JsonValue {
    match settled {
        SettledPath::Llm(Ok(links)) => json!({"path": "llm", "suggestions": links}),
        SettledPath::Llm(Err(e)) => json!({"path": "llm", "error": error_report(e)}),
        SettledPath::Rag(Ok(sources)) => json!({"path": "rag", "sources": sources}),
        SettledPath::Rag(Err(e)) => json!({"path": "rag", "error": error_report(e)}),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Read the draft from a file, or stdin for `-`.
pub fn read_draft(source: &Path) -> anyhow::Result<String> {
    if source == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read draft from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read draft {}", source.display()))
    }
}

fn orchestrator(store: &FileSettingsStore, corpus: PathBuf) -> anyhow::Result<Orchestrator> {
    let settings = store
        .load()
        .with_context(|| format!("Failed to load settings from {}", store.path().display()))?;
    info!(provider = %settings.provider, rag = settings.rag.is_enabled(), "Loaded settings");
    Ok(Orchestrator::from_settings(
        &settings,
        Arc::new(JsonFileCorpus::new(corpus)),
    )?)
}

/// Precondition failures are reported on stdout like path failures.
fn rejected(error: &Error) -> anyhow::Result<ExitCode> {
    print_json(&json!({"error": error_report(error)}))?;
    Ok(ExitCode::FAILURE)
}

pub async fn scan(
    store: &FileSettingsStore,
    draft: &Path,
    corpus: PathBuf,
    exclude: String,
) -> anyhow::Result<ExitCode> {
    let draft_text = read_draft(draft)?;
    let request = match SuggestionRequest::whole_document(draft_text, DocumentId::new(exclude)) {
        Ok(request) => request,
        Err(e) => return rejected(&e),
    };
    let orchestrator = orchestrator(store, corpus)?;

    let outcome = match orchestrator.suggest(&request).await {
        Ok(outcome) => outcome,
        Err(e) => return rejected(&e),
    };
    let ok = outcome.llm.is_ok();
    print_json(&path_report(&SettledPath::Llm(outcome.llm)))?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Prints each path as soon as it settles. Fails only when every path failed.
pub async fn lookup(
    store: &FileSettingsStore,
    phrase: &str,
    corpus: PathBuf,
    exclude: String,
) -> anyhow::Result<ExitCode> {
    let request = match SuggestionRequest::phrase_lookup(phrase, DocumentId::new(exclude)) {
        Ok(request) => request,
        Err(e) => return rejected(&e),
    };
    let orchestrator = orchestrator(store, corpus)?;

    let mut settled = match orchestrator.suggest_settled(&request).await {
        Ok(stream) => stream,
        Err(e) => return rejected(&e),
    };

    let mut any_ok = false;
    while let Some(path) = settled.next().await {
        any_ok |= matches!(path, SettledPath::Llm(Ok(_)) | SettledPath::Rag(Ok(_)));
        print_json(&path_report(&path))?;
    }
    if !orchestrator.has_rag() {
        debug!("RAG path not applicable");
    }
    Ok(if any_ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

pub fn config_show(store: &FileSettingsStore) -> anyhow::Result<ExitCode> {
    let settings = store.load()?;
    print_json(&json!({
        "path": store.path().display().to_string(),
        "settings": settings.redacted(),
    }))?;
    Ok(ExitCode::SUCCESS)
}

pub fn config_select(store: &FileSettingsStore, provider: ProviderKind) -> anyhow::Result<ExitCode> {
    let settings = store
        .switch_provider(provider)
        .with_context(|| format!("Failed to save settings to {}", store.path().display()))?;
    info!(provider = %settings.provider, path = %store.path().display(), "Switched provider");
    print_json(&json!({"provider": settings.provider}))?;
    Ok(ExitCode::SUCCESS)
}
