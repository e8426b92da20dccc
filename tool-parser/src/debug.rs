//! Debug-level and error-surfacing plumbing (spec §4.6, §7).
//!
//! Content-level faults never become `Err`s across the public boundary
//! (spec §7 "Propagation policy"): a malformed segment, a duplicate
//! string tag, or an incomplete stream all turn into a `Text` part plus
//! a call to `on_error`. The debug level only controls how much gets
//! logged via `tracing`; it never changes emitted content.

use tracing::{debug, trace};

/// How much the parser logs about its own internals. Independent of
/// `on_error`, which always fires regardless of this level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugLevel {
    #[default]
    Off,
    /// Emits a summary per batch parse / per completed stream.
    Parse,
    /// Logs every raw and parsed chunk as it is processed.
    Stream,
}

/// Callback invoked on every recoverable content-level fault (spec §4.6:
/// `onError(message, metadata)`). `metadata` is a free-form JSON object
/// so callers can route to logs, metrics, or silence it entirely.
pub type OnError = std::sync::Arc<dyn Fn(&str, serde_json::Value) + Send + Sync>;

pub fn default_on_error() -> OnError {
    std::sync::Arc::new(|message, metadata| {
        debug!(%message, %metadata, "tool-parser recoverable fault");
    })
}

pub fn log_parse_summary(level: DebugLevel, tool_calls: usize, text_parts: usize) {
    if matches!(level, DebugLevel::Parse | DebugLevel::Stream) {
        debug!(tool_calls, text_parts, "batch parse complete");
    }
}

pub fn log_stream_chunk(level: DebugLevel, raw: &str, parsed: Option<&serde_json::Value>) {
    if level == DebugLevel::Stream {
        trace!(raw, ?parsed, "stream chunk");
    }
}
