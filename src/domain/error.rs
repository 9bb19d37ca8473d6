//! Domain-level error types for slack-export.
//!
//! All errors are typed with `thiserror`. Fatal and non-fatal conditions share
//! one enum; callers decide which ones halt the run.

use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Token was rejected by `auth.test`.
    #[error("Authentication failed: {code}")]
    Auth { code: String },

    /// Slack answered with `ok: false`.
    #[error("Slack API error in {method}: {code}")]
    Api { method: String, code: String },

    /// Transport-level failure talking to Slack or downloading a file.
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Message timestamp could not be turned into a calendar date.
    #[error("Invalid time stamp: {ts}")]
    InvalidTimestamp { ts: String },

    /// JSON parsing or serialization failed.
    #[error("JSON parse error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Interactive selection could not be completed.
    #[error("Prompt error: {message}")]
    Prompt { message: String },

    /// Zip packaging failed.
    #[error("Archive error: {message}")]
    Archive {
        message: String,
        #[source]
        source: Option<zip::result::ZipError>,
    },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create an HTTP error from a reqwest error.
    pub fn http(err: reqwest::Error) -> Self {
        Self::Http {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an API error for a Slack method.
    pub fn api(method: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Api {
            method: method.into(),
            code: code.into(),
        }
    }

    /// Create a JSON parse error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an archive error with context.
    pub fn archive(message: impl Into<String>, err: zip::result::ZipError) -> Self {
        Self::Archive {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Short remote error code for log lines, when there is one.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Auth { code } | Self::Api { code, .. } => code,
            Self::Http { .. } => "http_error",
            Self::InvalidTimestamp { .. } => "invalid_ts",
            Self::JsonParse { .. } => "invalid_json",
            Self::Config { .. } => "config",
            Self::Prompt { .. } => "prompt",
            Self::Archive { .. } => "archive",
            Self::Io { .. } => "io",
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
