//! Incremental state machine for the JSON-in-marker protocol (spec §4.2
//! "Streaming state machine").

use protocol_types::StreamEvent;

use crate::debug::{default_on_error, OnError};
use crate::helpers::ends_with_partial_token;
use crate::id::{CounterIdGenerator, IdGenerator};
use crate::protocol::StreamParser;

use super::{earliest_end_match, parse_payload, JsonMarkerOptions};

enum State {
    Outside,
    InsideCall,
}

pub struct JsonMarkerStreamParser {
    options: JsonMarkerOptions,
    state: State,
    buffer: String,
    current_text_id: Option<String>,
    id_gen: CounterIdGenerator,
    on_error: OnError,
}

impl JsonMarkerStreamParser {
    pub fn new(options: JsonMarkerOptions) -> Self {
        Self {
            options,
            state: State::Outside,
            buffer: String::new(),
            current_text_id: None,
            id_gen: CounterIdGenerator::new("call"),
            on_error: default_on_error(),
        }
    }

    fn open_text(&mut self, out: &mut Vec<StreamEvent>) -> String {
        let id = self.current_text_id.clone().unwrap_or_else(|| {
            let id = self.id_gen.next_id();
            out.push(StreamEvent::TextStart { id: id.clone() });
            id
        });
        self.current_text_id = Some(id.clone());
        id
    }

    fn emit_text(&mut self, chunk: &str, out: &mut Vec<StreamEvent>) {
        if chunk.is_empty() {
            return;
        }
        let id = self.open_text(out);
        out.push(StreamEvent::TextDelta { id, delta: chunk.to_string() });
    }

    fn close_text(&mut self, out: &mut Vec<StreamEvent>) {
        if let Some(id) = self.current_text_id.take() {
            out.push(StreamEvent::TextEnd { id });
        }
    }

    fn emit_tool_call(&mut self, name: String, arguments: serde_json::Value, out: &mut Vec<StreamEvent>) {
        let input = serde_json::to_string(&arguments).unwrap_or_else(|_| "{}".to_string());
        out.push(StreamEvent::ToolCall { id: self.id_gen.next_id(), name, input });
    }

    fn drain(&mut self, out: &mut Vec<StreamEvent>) {
        loop {
            match self.state {
                State::Outside => {
                    if let Some(pos) = self.buffer.find(self.options.tool_call_start.as_str()) {
                        let prefix: String = self.buffer.drain(..pos).collect();
                        self.emit_text(&prefix, out);
                        self.buffer.drain(..self.options.tool_call_start.len());
                        self.state = State::InsideCall;
                        continue;
                    }
                    let withhold = ends_with_partial_token(&self.buffer, &self.options.tool_call_start).unwrap_or(0);
                    let flush_len = self.buffer.len() - withhold;
                    if flush_len > 0 {
                        let flushed: String = self.buffer.drain(..flush_len).collect();
                        self.emit_text(&flushed, out);
                    }
                    return;
                }
                State::InsideCall => {
                    match earliest_end_match(&self.buffer, &self.options.tool_call_end) {
                        Some((payload_end, marker_end)) => {
                            let raw_payload: String = self.buffer.drain(..payload_end).collect();
                            let matched_marker: String = self.buffer.drain(..marker_end - payload_end).collect();
                            match parse_payload(&raw_payload) {
                                Some(payload) => self.emit_tool_call(payload.name, payload.arguments, out),
                                None => {
                                    (self.on_error)(
                                        "could not process tool call, keeping original text",
                                        serde_json::json!({ "payload": raw_payload }),
                                    );
                                    let original = format!(
                                        "{}{}{}",
                                        self.options.tool_call_start, raw_payload, matched_marker
                                    );
                                    self.emit_text(&original, out);
                                }
                            }
                            self.state = State::Outside;
                            continue;
                        }
                        None => return,
                    }
                }
            }
        }
    }
}

impl StreamParser for JsonMarkerStreamParser {
    fn push(&mut self, event: StreamEvent) -> Vec<StreamEvent> {
        let mut out = Vec::new();
        match event {
            StreamEvent::TextDelta { delta, .. } => {
                self.buffer.push_str(&delta);
                self.drain(&mut out);
            }
            other => match self.state {
                State::Outside => {
                    self.close_text(&mut out);
                    out.push(other);
                }
                State::InsideCall => {
                    // Forward non-text events untouched; they do not
                    // disturb the buffered call payload.
                    out.push(other);
                }
            },
        }
        out
    }

    fn finish(&mut self) -> Vec<StreamEvent> {
        let mut out = Vec::new();
        match self.state {
            State::Outside => {
                let remaining = std::mem::take(&mut self.buffer);
                self.emit_text(&remaining, &mut out);
            }
            State::InsideCall => {
                // Unterminated call: not a tool call, surface the start
                // marker plus whatever payload was buffered as text.
                let remaining = std::mem::take(&mut self.buffer);
                let original = format!("{}{}", self.options.tool_call_start, remaining);
                self.emit_text(&original, &mut out);
                self.state = State::Outside;
            }
        }
        self.close_text(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_chunks(parser: &mut JsonMarkerStreamParser, chunks: &[&str]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(parser.push(StreamEvent::TextDelta { id: "src".to_string(), delta: chunk.to_string() }));
        }
        events.extend(parser.finish());
        events
    }

    #[test]
    fn single_chunk_call_round_trips() {
        let mut parser = JsonMarkerStreamParser::new(JsonMarkerOptions::default());
        let events = push_chunks(&mut parser, &[r#"before <tool_call>{"name":"f","arguments":{"x":1}}</tool_call> after"#]);
        assert!(events.iter().any(|e| matches!(e, StreamEvent::ToolCall { name, .. } if name == "f")));
    }

    #[test]
    fn marker_split_across_chunks() {
        let mut parser = JsonMarkerStreamParser::new(JsonMarkerOptions::default());
        let events = push_chunks(
            &mut parser,
            &["<tool_", "call>{\"name\":\"f\",\"argumen", "ts\":{}}</tool_call", ">"],
        );
        assert!(events.iter().any(|e| matches!(e, StreamEvent::ToolCall { name, .. } if name == "f")));
    }

    #[test]
    fn unterminated_call_becomes_text_at_finish() {
        let mut parser = JsonMarkerStreamParser::new(JsonMarkerOptions::default());
        let events = push_chunks(&mut parser, &["<tool_call>{\"name\":\"f\""]);
        let joined: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::TextDelta { delta, .. } => Some(delta.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(joined, "<tool_call>{\"name\":\"f\"");
        assert!(!events.iter().any(|e| matches!(e, StreamEvent::ToolCall { .. })));
    }

    #[test]
    fn malformed_payload_falls_back_to_text_mid_stream() {
        let mut parser = JsonMarkerStreamParser::new(JsonMarkerOptions::default());
        let events = push_chunks(&mut parser, &["<tool_call>not json</tool_call> tail"]);
        assert!(!events.iter().any(|e| matches!(e, StreamEvent::ToolCall { .. })));
        let joined: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::TextDelta { delta, .. } => Some(delta.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(joined, "<tool_call>not json</tool_call> tail");
    }

    #[test]
    fn partial_start_marker_at_tail_is_withheld() {
        let mut parser = JsonMarkerStreamParser::new(JsonMarkerOptions::default());
        let events = parser.push(StreamEvent::TextDelta { id: "src".to_string(), delta: "hello <tool_c".to_string() });
        let joined: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::TextDelta { delta, .. } => Some(delta.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(joined, "hello ");
    }
}
