//! Stream event shapes: spec §3 "Stream event" and §6 "Stream event (bidirectional)".

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Token/cost accounting forwarded on `Finish`. Optional because not
/// every host reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Usage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

/// The recognized, typed subset of [`StreamEvent`]. Kept separate so it
/// can derive the usual `#[serde(tag = "type")]` representation; the
/// public enum wraps this plus an `Other` catch-all that a derived
/// internally-tagged enum can't express.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum KnownEvent {
    TextStart {
        id: String,
    },
    TextDelta {
        id: String,
        delta: String,
    },
    TextEnd {
        id: String,
    },
    ToolCall {
        id: String,
        name: String,
        input: String,
    },
    Finish {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>,
    },
    Error {
        error: String,
    },
}

/// A single event in the bidirectional stream-event shape.
///
/// Ordering contract (spec §3): between a matched `TextStart{id}` and
/// `TextEnd{id}`, only `TextDelta{id}` for that same id appears; tool
/// calls and `Finish` appear outside any open text region. `Other`
/// carries any event type this parser doesn't recognize, forwarded
/// verbatim and in original order (spec §6).
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    TextStart { id: String },
    TextDelta { id: String, delta: String },
    TextEnd { id: String },
    ToolCall { id: String, name: String, input: String },
    Finish { reason: String, usage: Option<Usage> },
    Error { error: String },
    /// Opaque passthrough for any host event type this parser doesn't
    /// recognize.
    Other(Value),
}

impl From<KnownEvent> for StreamEvent {
    fn from(ev: KnownEvent) -> Self {
        match ev {
            KnownEvent::TextStart { id } => StreamEvent::TextStart { id },
            KnownEvent::TextDelta { id, delta } => StreamEvent::TextDelta { id, delta },
            KnownEvent::TextEnd { id } => StreamEvent::TextEnd { id },
            KnownEvent::ToolCall { id, name, input } => StreamEvent::ToolCall { id, name, input },
            KnownEvent::Finish { reason, usage } => StreamEvent::Finish { reason, usage },
            KnownEvent::Error { error } => StreamEvent::Error { error },
        }
    }
}

impl Serialize for StreamEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.clone() {
            StreamEvent::Other(value) => value.serialize(serializer),
            other => {
                let known = match other {
                    StreamEvent::TextStart { id } => KnownEvent::TextStart { id },
                    StreamEvent::TextDelta { id, delta } => KnownEvent::TextDelta { id, delta },
                    StreamEvent::TextEnd { id } => KnownEvent::TextEnd { id },
                    StreamEvent::ToolCall { id, name, input } => {
                        KnownEvent::ToolCall { id, name, input }
                    }
                    StreamEvent::Finish { reason, usage } => KnownEvent::Finish { reason, usage },
                    StreamEvent::Error { error } => KnownEvent::Error { error },
                    StreamEvent::Other(_) => unreachable!(),
                };
                known.serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for StreamEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match serde_json::from_value::<KnownEvent>(value.clone()) {
            Ok(known) => Ok(known.into()),
            Err(_) => Ok(StreamEvent::Other(value)),
        }
    }
}
