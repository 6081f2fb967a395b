//! Error handling types and utilities.

use serde::Serialize;

/// A specialized Result type for startup and configuration code.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods.
pub type Result<T> = anyhow::Result<T>;

/// Error raised by the ingestion and query pipeline.
///
/// Messages are carried as strings so the error stays `Clone`: an in-flight
/// index build is shared between every caller waiting on the same source, and
/// each of them receives its own copy of the outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocsError {
    /// Network or HTTP failure while downloading a source.
    #[error("fetch failed: {0}")]
    Fetch(String),
    /// The archive is corrupt or holds no eligible documents.
    #[error("extraction failed: {0}")]
    Extract(String),
    /// Index construction failed.
    #[error("index build failed: {0}")]
    Build(String),
    /// Malformed request parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Machine-readable category of a [`DocsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    FetchError,
    ExtractError,
    BuildError,
    InvalidArgument,
}

impl DocsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch(_) => ErrorKind::FetchError,
            Self::Extract(_) => ErrorKind::ExtractError,
            Self::Build(_) => ErrorKind::BuildError,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }

    /// Human-readable message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Fetch(msg) | Self::Extract(msg) | Self::Build(msg) | Self::InvalidArgument(msg) => {
                msg
            }
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<reqwest::Error> for DocsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Fetch(format!("request timed out: {}", err))
        } else if err.is_connect() {
            Self::Fetch(format!("connection error: {}", err))
        } else if let Some(status) = err.status() {
            Self::Fetch(format!("HTTP error {}: {}", status, err))
        } else {
            Self::Fetch(format!("request failed: {}", err))
        }
    }
}

/// Structured error payload returned to the calling assistant.
#[derive(Debug, Clone, Serialize)]
pub struct ToolError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&DocsError> for ToolError {
    fn from(err: &DocsError) -> Self {
        Self {
            kind: err.kind(),
            message: err.message().to_string(),
        }
    }
}

impl ToolError {
    /// Renders the error as the JSON text handed back through the tool boundary.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| format!("{{\"kind\":\"internal\",\"message\":{:?}}}", self.message))
    }
}
