//! Provider settings and their persistence.
//!
//! Settings hold a provider selector plus the stored configuration of *every*
//! LLM backend, so flipping the selector never loses the other backend's
//! credentials. Settings can be loaded from:
//! - TOML files (default: ~/.config/linkweave/settings.toml)
//! - Environment variables (LINKWEAVE_* prefixed)
//!
//! # Example
//!
//! ```rust,no_run
//! use linkweave_inference::config::{FileSettingsStore, ProviderKind, SettingsStore};
//!
//! let store = FileSettingsStore::new(FileSettingsStore::default_path());
//! let mut settings = store.load().expect("Failed to load settings");
//! settings.select_provider(ProviderKind::OpenAiCompatible);
//! store.save(&settings).expect("Failed to save settings");
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, info};

use linkweave_core::defaults;
use linkweave_core::{Error, Result};

/// Which LLM backend is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Hosted structured-output API.
    #[default]
    Gemini,
    /// Any `/chat/completions` endpoint.
    OpenAiCompatible,
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" | "openai-compatible" | "openai_compatible" => Ok(Self::OpenAiCompatible),
            other => Err(Error::Config(format!("Invalid provider: {}", other))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::OpenAiCompatible => write!(f, "openai_compatible"),
        }
    }
}

/// Gemini backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key, sent as the `key` query parameter.
    #[serde(default)]
    pub api_key: String,
    /// Full `:generateContent` endpoint URL.
    #[serde(default = "GeminiConfig::default_endpoint")]
    pub endpoint: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: Self::default_endpoint(),
        }
    }
}

impl GeminiConfig {
    fn default_endpoint() -> String {
        defaults::GEMINI_ENDPOINT.to_string()
    }

    pub fn validate(&self) -> Result<()> {
        validate_url("Gemini endpoint", &self.endpoint)
    }
}

/// OpenAI-compatible backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAiCompatibleConfig {
    /// Base URL; `/chat/completions` is appended.
    #[serde(default)]
    pub base_url: String,
    /// Model name sent with every request.
    #[serde(default)]
    pub model: String,
    /// Bearer token (optional for local endpoints).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::OPENAI_BASE_URL.to_string(),
            model: defaults::OPENAI_MODEL.to_string(),
            api_key: None,
        }
    }
}

impl OpenAiCompatibleConfig {
    pub fn validate(&self) -> Result<()> {
        validate_url("OpenAI-compatible base_url", &self.base_url)
    }
}

/// RAG service configuration. An empty base URL disables RAG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Client address reported in chat requests.
    #[serde(default = "RagConfig::default_user_ip")]
    pub user_ip: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_ip: Self::default_user_ip(),
        }
    }
}

impl RagConfig {
    fn default_user_ip() -> String {
        defaults::RAG_USER_IP.to_string()
    }

    /// Configured base URL, if non-blank.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn is_enabled(&self) -> bool {
        self.base_url().is_some()
    }

    pub fn validate(&self) -> Result<()> {
        match self.base_url() {
            Some(url) => validate_url("RAG base_url", url),
            None => Ok(()),
        }
    }
}

/// Snapshot of the active LLM backend's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum ProviderConfig {
    Gemini(GeminiConfig),
    OpenAiCompatible(OpenAiCompatibleConfig),
}

impl ProviderConfig {
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Gemini(_) => ProviderKind::Gemini,
            Self::OpenAiCompatible(_) => ProviderKind::OpenAiCompatible,
        }
    }
}

/// Persisted linkweave settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Active LLM backend.
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub openai_compatible: OpenAiCompatibleConfig,
    #[serde(default)]
    pub rag: RagConfig,
}

impl Settings {
    /// Switch the active backend. Stored configs are untouched.
    pub fn select_provider(&mut self, kind: ProviderKind) {
        if self.provider != kind {
            info!(from = %self.provider, to = %kind, "Switching LLM provider");
        }
        self.provider = kind;
    }

    /// Snapshot the active backend's configuration.
    pub fn active_provider(&self) -> ProviderConfig {
        match self.provider {
            ProviderKind::Gemini => ProviderConfig::Gemini(self.gemini.clone()),
            ProviderKind::OpenAiCompatible => {
                ProviderConfig::OpenAiCompatible(self.openai_compatible.clone())
            }
        }
    }

    /// Copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.gemini.api_key.is_empty() {
            copy.gemini.api_key = mask(&copy.gemini.api_key);
        }
        if let Some(key) = copy.openai_compatible.api_key.as_mut() {
            *key = mask(key);
        }
        copy
    }

    /// Get the default settings file path.
    ///
    /// Returns: ~/.config/linkweave/settings.toml
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push("linkweave");
        path.push("settings.toml");
        path
    }

    /// Parse settings from TOML, expanding `${VAR}` references first.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);
        let settings: Settings = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize TOML: {}", e)))
    }

    /// Load settings from environment variables.
    pub fn from_env() -> Self {
        let provider = env::var("LINKWEAVE_PROVIDER")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let gemini = GeminiConfig {
            api_key: env::var("LINKWEAVE_GEMINI_API_KEY").unwrap_or_default(),
            endpoint: env::var("LINKWEAVE_GEMINI_ENDPOINT")
                .unwrap_or_else(|_| defaults::GEMINI_ENDPOINT.to_string()),
        };

        let openai_compatible = OpenAiCompatibleConfig {
            base_url: env::var("LINKWEAVE_OPENAI_BASE_URL")
                .unwrap_or_else(|_| defaults::OPENAI_BASE_URL.to_string()),
            model: env::var("LINKWEAVE_OPENAI_MODEL")
                .unwrap_or_else(|_| defaults::OPENAI_MODEL.to_string()),
            api_key: env::var("LINKWEAVE_OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
        };

        let rag = RagConfig {
            base_url: env::var("LINKWEAVE_RAG_BASE_URL").ok(),
            user_ip: env::var("LINKWEAVE_RAG_USER_IP")
                .unwrap_or_else(|_| defaults::RAG_USER_IP.to_string()),
        };

        Self {
            provider,
            gemini,
            openai_compatible,
            rag,
        }
    }

    /// Validate URL shapes. Missing credentials are reported at call time.
    pub fn validate(&self) -> Result<()> {
        self.gemini.validate()?;
        self.openai_compatible.validate()?;
        self.rag.validate()
    }

    /// Substitute environment variables in the format ${VAR_NAME}.
    fn substitute_env_vars(content: &str) -> String {
        let re = match regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
            Ok(re) => re,
            Err(_) => return content.to_string(),
        };
        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}

/// Empty URLs pass; a call needing one reports `ConfigMissing` instead.
fn validate_url(label: &str, url: &str) -> Result<()> {
    let url = url.trim();
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} must start with http:// or https://, got: {}",
            label, url
        )))
    }
}

fn mask(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{}", tail)
    }
}

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Storage for [`Settings`].
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Settings>;
    fn save(&self, settings: &Settings) -> Result<()>;

    /// Load, switch the active backend, save. Returns the saved settings.
    fn switch_provider(&self, kind: ProviderKind) -> Result<Settings> {
        let mut settings = self.load()?;
        settings.select_provider(kind);
        self.save(&settings)?;
        Ok(settings)
    }
}

/// TOML file store.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        Settings::default_path()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    /// Reads the file if present, otherwise falls back to environment variables.
    fn load(&self) -> Result<Settings> {
        if self.path.exists() {
            info!("Loading settings from: {}", self.path.display());
            let content = std::fs::read_to_string(&self.path)?;
            Settings::from_toml_str(&content)
        } else {
            debug!(
                "Settings file not found at {}, using environment variables",
                self.path.display()
            );
            Ok(Settings::from_env())
        }
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        settings.validate()?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, settings.to_toml_string()?)?;
        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }

    /// Rewrites only the `provider` key of an existing file, so `${VAR}`
    /// references are kept as written rather than replaced by their values.
    fn switch_provider(&self, kind: ProviderKind) -> Result<Settings> {
        if !self.path.exists() {
            let mut settings = self.load()?;
            settings.select_provider(kind);
            self.save(&settings)?;
            return Ok(settings);
        }

        let raw = std::fs::read_to_string(&self.path)?;
        let mut settings = Settings::from_toml_str(&raw)?;
        settings.select_provider(kind);

        let mut table: toml::Table = raw
            .parse()
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        table.insert("provider".to_string(), toml::Value::String(kind.to_string()));
        let edited = toml::to_string_pretty(&table)
            .map_err(|e| Error::Config(format!("Failed to serialize TOML: {}", e)))?;

        std::fs::write(&self.path, edited)?;
        debug!(provider = %kind, "Updated provider in {}", self.path.display());
        Ok(settings)
    }
}

/// In-process store, for tests and embedding hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings> {
        self.settings
            .lock()
            .map(|s| s.clone())
            .map_err(|_| Error::Config("settings lock poisoned".to_string()))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        settings.validate()?;
        let mut guard = self
            .settings
            .lock()
            .map_err(|_| Error::Config("settings lock poisoned".to_string()))?;
        *guard = settings.clone();
        Ok(())
    }
}
