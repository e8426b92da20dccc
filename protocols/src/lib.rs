//! Wire types shared by every tool-call protocol: tool descriptors, the
//! batch content-part shape, and the bidirectional stream-event shape.
//!
//! This crate holds data only — no parsing, no heuristics, no I/O. The
//! `tool-parser` crate depends on it the way the teacher's `tool-parser`
//! crate depends on `openai-protocol` for its `Tool`/`Function` types.

pub mod content;
pub mod outbound;
pub mod schema;
pub mod stream_event;
pub mod tool;

pub use content::ContentPart;
pub use outbound::{ContentOutcomePart, OutboundToolCall, ToolCallInput, ToolOutcome, ToolResponse};
pub use schema::JsonSchemaLike;
pub use stream_event::{StreamEvent, Usage};
pub use tool::ToolDefinition;
