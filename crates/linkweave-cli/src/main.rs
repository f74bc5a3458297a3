//! linkweave: internal link suggestions for drafts.
//!
//! Results are written to stdout as JSON. Logs go to stderr (or `LOG_FILE`).

mod commands;

use clap::{Parser, Subcommand};
use linkweave_inference::ProviderKind;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "linkweave")]
#[command(author, version, about = "Internal link suggestions for drafts")]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file (default: ~/.config/linkweave/settings.toml)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a whole draft for phrases worth linking
    Scan {
        /// Draft text file, or "-" for stdin
        #[arg(short, long)]
        draft: PathBuf,

        /// Corpus JSON file (array of {id, title, url, status?})
        #[arg(short, long)]
        corpus: PathBuf,

        /// Id of the document being edited
        #[arg(short, long)]
        exclude: String,
    },

    /// Find link targets and external sources for one phrase
    Lookup {
        /// Phrase to link
        #[arg(short, long)]
        phrase: String,

        /// Corpus JSON file (array of {id, title, url, status?})
        #[arg(short, long)]
        corpus: PathBuf,

        /// Id of the document being edited
        #[arg(short, long)]
        exclude: String,
    },

    /// Inspect or change provider settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current settings with secrets masked
    Show,

    /// Make a provider the active LLM backend
    Select {
        /// gemini | openai-compatible
        provider: ProviderKind,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_tracing();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let store = commands::settings_store(cli.settings);
    match cli.command {
        Commands::Scan {
            draft,
            corpus,
            exclude,
        } => commands::scan(&store, &draft, corpus, exclude).await,
        Commands::Lookup {
            phrase,
            corpus,
            exclude,
        } => commands::lookup(&store, &phrase, corpus, exclude).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_show(&store),
            ConfigAction::Select { provider } => commands::config_select(&store, provider),
        },
    }
}

/// Initialize tracing with configurable output.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
///   RUST_LOG    - standard env filter (default: "linkweave=info")
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "linkweave=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("linkweave.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // stdout carries results, so console logs go to stderr
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );
    guard
}
