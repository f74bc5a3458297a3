//! Error types for linkweave.

use serde::Serialize;
use thiserror::Error;

/// Result type alias using linkweave's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for suggestion and provider operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A required credential or URL is absent. Raised before any network call.
    #[error("Configuration missing: {0}")]
    ConfigMissing(String),

    /// Provider answered with a status other than 200 OK.
    #[error("Provider returned HTTP {status}: {body}")]
    ApiError { status: u16, body: String },

    /// Provider answered 200 but the payload is unparseable or mis-shaped.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// Request text is empty after trimming.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// No candidate documents are available to link to.
    #[error("Empty corpus: no candidate documents to link to")]
    EmptyCorpus,

    /// HTTP/network request failed before a status was received (connect, timeout)
    #[error("Request error: {0}")]
    Request(String),

    /// Settings could not be read or are invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Machine-readable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigMissing,
    ApiError,
    InvalidResponse,
    EmptyInput,
    EmptyCorpus,
    Request,
    Config,
    Serialization,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigMissing => "config_missing",
            Self::ApiError => "api_error",
            Self::InvalidResponse => "invalid_response",
            Self::EmptyInput => "empty_input",
            Self::EmptyCorpus => "empty_corpus",
            Self::Request => "request",
            Self::Config => "config",
            Self::Serialization => "serialization",
            Self::Io => "io",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConfigMissing(_) => ErrorKind::ConfigMissing,
            Error::ApiError { .. } => ErrorKind::ApiError,
            Error::InvalidResponse(_) => ErrorKind::InvalidResponse,
            Error::EmptyInput(_) => ErrorKind::EmptyInput,
            Error::EmptyCorpus => ErrorKind::EmptyCorpus,
            Error::Request(_) => ErrorKind::Request,
            Error::Config(_) => ErrorKind::Config,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// HTTP status for [`Error::ApiError`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config_missing() {
        let err = Error::ConfigMissing("Gemini API key".to_string());
        assert_eq!(err.to_string(), "Configuration missing: Gemini API key");
    }

    #[test]
    fn test_error_display_api_error() {
        let err = Error::ApiError {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Provider returned HTTP 500: boom");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_error_display_invalid_response() {
        let err = Error::InvalidResponse("no text".to_string());
        assert_eq!(err.to_string(), "Invalid provider response: no text");
    }

    #[test]
    fn test_error_display_empty_corpus() {
        assert_eq!(
            Error::EmptyCorpus.to_string(),
            "Empty corpus: no candidate documents to link to"
        );
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Error::EmptyCorpus.kind(), ErrorKind::EmptyCorpus);
        assert_eq!(
            Error::EmptyInput("anchor".into()).kind(),
            ErrorKind::EmptyInput
        );
        assert_eq!(Error::Request("timeout".into()).kind(), ErrorKind::Request);
        assert_eq!(Error::InvalidResponse("x".into()).status(), None);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::InvalidResponse).unwrap();
        assert_eq!(json, "\"invalid_response\"");
        assert_eq!(ErrorKind::ApiError.to_string(), "api_error");
    }

    #[test]
    fn test_from_serde_json_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = parse_err.into();
        assert_eq!(err.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "settings.toml");
        let err: Error = io.into();
        assert!(err.to_string().starts_with("I/O error"));
    }
}
