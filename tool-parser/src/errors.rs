//! Error types for the tool-call parsing engine.
//!
//! Content-level faults (malformed segments, duplicate tags, incomplete
//! streams) never surface as `Err` — per spec §7 they become `Text`
//! parts plus an `onError` callback invocation. `ParserError` is
//! reserved for genuine construction-time misconfiguration and for
//! wrapping the underlying JSON/XML readers' own error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("invalid protocol configuration: {0}")]
    InvalidConfiguration(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("relaxed json error: {0}")]
    RelaxedJson(#[from] crate::relaxed_json::SyntaxError),

    #[error("xml error: {0}")]
    Xml(String),
}

pub type ParserResult<T> = Result<T, ParserError>;
