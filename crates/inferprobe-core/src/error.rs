//! Error types for loading, dispatching and reporting.

use std::path::Path;
use std::time::Duration;

/// Errors that abort a run.
///
/// Per-case failures never surface here: a non-2xx status or a wrong label is
/// a data outcome, and a transport failure is reported as a [`TransportError`]
/// attached to the offending case.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Input file unreadable, not JSON, or missing required fields.
    #[error("malformed input {path}: {message}")]
    MalformedInput { path: String, message: String },

    /// Configuration missing or invalid.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// HTTP client could not be constructed.
    #[error("http client error: {message}")]
    Client { message: String },

    /// An output artifact could not be written.
    #[error("failed to write {path}: {message}")]
    Output { path: String, message: String },
}

impl ProbeError {
    pub fn malformed(path: &Path, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn output(path: &Path, message: impl std::fmt::Display) -> Self {
        Self::Output {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MalformedInput { .. } => 2,
            Self::Config { .. } => 2,
            Self::Client { .. } => 2,
            Self::Output { .. } => 3,
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Client {
            message: err.to_string(),
        }
    }
}

/// Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    Timeout,
    Network,
    Decode,
    Aborted,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::Decode => "decode",
            Self::Aborted => "aborted",
        }
    }
}

/// A single call failed below the HTTP status level.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {message}")]
    Network { message: String },

    #[error("failed to decode response body: {message}")]
    Decode { message: String },

    /// The task running the call panicked or was cancelled.
    #[error("task aborted: {message}")]
    Aborted { message: String },
}

impl TransportError {
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            Self::Timeout(_) => TransportErrorKind::Timeout,
            Self::Network { .. } => TransportErrorKind::Network,
            Self::Decode { .. } => TransportErrorKind::Decode,
            Self::Aborted { .. } => TransportErrorKind::Aborted,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode {
                message: err.to_string(),
            }
        } else {
            Self::Network {
                message: err.to_string(),
            }
        }
    }
}
