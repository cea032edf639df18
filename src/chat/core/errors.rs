//! Error types for the chat reader.

use thiserror::Error;

/// Chat reader error type.
///
/// Variants never carry raw store payloads, only enough context (workspace,
/// key, position) to log meaningfully.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// No workspace, conversation or chat id matched the request.
    #[error("not found: {0}")]
    NotFound(String),
    /// A known key held a value that did not parse in any accepted shape.
    #[error("malformed value under `{key}`: {detail}")]
    Parse {
        /// Store key whose value was rejected.
        key: String,
        /// Error category and position, without payload text.
        detail: String,
    },
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// `SQLite` store error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A background workspace read did not complete.
    #[error("workspace task failed: {0}")]
    Task(String),
}

impl ReaderError {
    /// Build a parse error for `key` from a serde failure, dropping the payload.
    pub fn parse(key: &str, err: &serde_json::Error) -> Self {
        let category = match err.classify() {
            serde_json::error::Category::Io => "io",
            serde_json::error::Category::Syntax => "syntax",
            serde_json::error::Category::Data => "unexpected shape",
            serde_json::error::Category::Eof => "truncated",
        };
        Self::Parse {
            key: key.to_string(),
            detail: format!("{category} at line {} column {}", err.line(), err.column()),
        }
    }

    /// Whether this error reports an empty or missing result.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether this error reports a malformed payload.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// Convenience result alias for reader operations.
pub type ReaderResult<T> = Result<T, ReaderError>;
