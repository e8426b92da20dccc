//! A tolerant JSON reader (spec §4.4): unquoted identifier keys,
//! single-quoted strings, trailing commas, line/block comments, and a
//! choice of duplicate-key policy. Used both to parse JSON-in-marker
//! payloads and, inside the schema coercer, to rescue string-encoded
//! objects/arrays the model emitted with relaxed syntax.
//!
//! Implemented as a hand-written lexer (`lexer.rs`) feeding a
//! recursive-descent parser (`parser.rs`) rather than regex-based token
//! peeking, which gets confused on nested quoting.

mod lexer;
mod parser;

pub use parser::{parse, DuplicateKeyPolicy, Mode, Parsed, ReaderOptions, SyntaxError};

use serde_json::Value;

/// Parse in the default relaxed mode with last-wins duplicate keys.
pub fn parse_relaxed(src: &str) -> Result<Value, SyntaxError> {
    parse(src, &ReaderOptions::default()).map(|p| p.value)
}

/// Parse in strict mode (rejects anything standard `serde_json` would reject too,
/// modulo the hand-written lexer's own coverage).
pub fn parse_strict(src: &str) -> Result<Value, SyntaxError> {
    parse(
        src,
        &ReaderOptions {
            mode: Mode::Strict,
            duplicate_keys: DuplicateKeyPolicy::Reject,
        },
    )
    .map(|p| p.value)
}

/// Parse in tolerant mode, returning both the value and any warnings
/// accumulated along the way instead of failing.
pub fn parse_tolerant(src: &str) -> Result<Parsed, SyntaxError> {
    parse(
        src,
        &ReaderOptions {
            mode: Mode::Tolerant,
            duplicate_keys: DuplicateKeyPolicy::LastWins,
        },
    )
}
