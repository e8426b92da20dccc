//! The XML protocol's incremental stream parser (spec §4.1 "Stream
//! contract"): a two-state machine (`Outside` / `Inside(name)`) over a
//! growing buffer, bounded by the longest declared open tag (spec
//! "Lookahead discipline").

use protocol_types::{JsonSchemaLike, StreamEvent, ToolDefinition};

use crate::debug::{default_on_error, OnError};
use crate::heuristics;
use crate::helpers::ends_with_partial_token;
use crate::id::{CounterIdGenerator, IdGenerator};
use crate::protocol::StreamParser;
use crate::types::{IntermediateCall, PipelineConfig};
use crate::xml_walk::{find_balanced_close, find_next_open_tag};

enum State {
    Outside,
    Inside {
        name: String,
        schema: JsonSchemaLike,
        /// Exact bytes of the opening tag as consumed, so an
        /// unterminated call can be reconstructed byte-for-byte at
        /// `finish()` (spec §7 "Incomplete stream").
        open_tag_raw: String,
    },
}

pub struct XmlStreamParser {
    tools: Vec<ToolDefinition>,
    names: Vec<String>,
    open_tag_tokens: Vec<String>,
    pipeline: PipelineConfig,
    state: State,
    buffer: String,
    current_text_id: Option<String>,
    id_gen: CounterIdGenerator,
    on_error: OnError,
}

impl XmlStreamParser {
    pub fn new(tools: Vec<ToolDefinition>, pipeline: PipelineConfig) -> Self {
        let names: Vec<String> = tools.iter().map(|t| t.name.clone()).filter(|n| !n.is_empty()).collect();
        // Both the ordinary and self-closing opening-tag forms must be
        // withheld at the tail so a split self-closing call (e.g.
        // `"<ping/"` + `">"`) isn't flushed as text before it completes
        // (spec §8 "Tag name split across chunks").
        let open_tag_tokens: Vec<String> = names
            .iter()
            .flat_map(|n| [format!("<{n}>"), format!("<{n}/>")])
            .collect();
        Self {
            tools,
            names,
            open_tag_tokens,
            pipeline,
            state: State::Outside,
            buffer: String::new(),
            current_text_id: None,
            id_gen: CounterIdGenerator::default(),
            on_error: default_on_error(),
        }
    }

    fn schema_for(&self, name: &str) -> JsonSchemaLike {
        self.tools
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.input_schema.clone())
            .unwrap_or_default()
    }

    fn name_refs(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    fn emit_text(&mut self, events: &mut Vec<StreamEvent>, s: &str) {
        if s.is_empty() {
            return;
        }
        if self.current_text_id.is_none() {
            let id = self.id_gen.next_id();
            events.push(StreamEvent::TextStart { id: id.clone() });
            self.current_text_id = Some(id);
        }
        let id = self.current_text_id.clone().unwrap();
        events.push(StreamEvent::TextDelta { id, delta: s.to_string() });
    }

    fn close_text(&mut self, events: &mut Vec<StreamEvent>) {
        if let Some(id) = self.current_text_id.take() {
            events.push(StreamEvent::TextEnd { id });
        }
    }

    /// Drain as much of the buffer as the current state allows,
    /// appending produced events to `events`. Loops until no further
    /// progress is possible with the buffered content so far.
    fn drain(&mut self, events: &mut Vec<StreamEvent>) {
        loop {
            match std::mem::replace(&mut self.state, State::Outside) {
                State::Outside => {
                    let names = self.name_refs();
                    if names.is_empty() {
                        self.emit_text(events, &std::mem::take(&mut self.buffer));
                        self.state = State::Outside;
                        return;
                    }
                    match find_next_open_tag(&self.buffer, 0, Some(&names)) {
                        Some(open) => {
                            self.emit_text(events, &self.buffer[..open.start].to_string());
                            if open.self_closing {
                                self.close_text(events);
                                let id = self.id_gen.next_id();
                                events.push(StreamEvent::ToolCall {
                                    id,
                                    name: open.name.clone(),
                                    input: "{}".to_string(),
                                });
                                self.buffer.drain(..open.tag_end);
                                self.state = State::Outside;
                                // keep looping over any remaining buffer
                            } else {
                                self.close_text(events);
                                let open_tag_raw = self.buffer[open.start..open.tag_end].to_string();
                                let schema = self.schema_for(&open.name);
                                self.buffer.drain(..open.tag_end);
                                self.state = State::Inside {
                                    name: open.name,
                                    schema,
                                    open_tag_raw,
                                };
                            }
                        }
                        None => {
                            let withhold = self
                                .open_tag_tokens
                                .iter()
                                .filter_map(|tok| ends_with_partial_token(&self.buffer, tok))
                                .max()
                                .unwrap_or(0);
                            let flush_len = self.buffer.len() - withhold;
                            let flushed = self.buffer[..flush_len].to_string();
                            self.emit_text(events, &flushed);
                            self.buffer.drain(..flush_len);
                            self.state = State::Outside;
                            return;
                        }
                    }
                }
                State::Inside { name, schema, open_tag_raw } => {
                    match find_balanced_close(&self.buffer, &name, 0) {
                        Some((content_end, after)) => {
                            let raw_inner = self.buffer[..content_end].to_string();
                            let original_span_end = after;
                            let ctx = IntermediateCall::new(name.clone(), schema.clone(), raw_inner);
                            let result = heuristics::run_pipeline(&self.pipeline, ctx);
                            if let Some(parsed) = &result.parsed {
                                let input = serde_json::to_string(parsed).unwrap_or_else(|_| "{}".to_string());
                                let id = self.id_gen.next_id();
                                events.push(StreamEvent::ToolCall { id, name: name.clone(), input });
                            } else {
                                (self.on_error)(
                                    "could not process tool call, keeping original text",
                                    serde_json::json!({ "tool": name, "errors": result.errors }),
                                );
                                let original_span = format!("{open_tag_raw}{}", &self.buffer[..original_span_end]);
                                self.emit_text(events, &original_span);
                            }
                            self.buffer.drain(..after);
                            self.state = State::Outside;
                        }
                        None => {
                            self.state = State::Inside { name, schema, open_tag_raw };
                            return;
                        }
                    }
                }
            }
        }
    }
}

impl StreamParser for XmlStreamParser {
    fn push(&mut self, event: StreamEvent) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        match event {
            StreamEvent::TextDelta { delta, .. } => {
                self.buffer.push_str(&delta);
                self.drain(&mut events);
            }
            other => match &self.state {
                State::Outside => {
                    let flushed = std::mem::take(&mut self.buffer);
                    self.emit_text(&mut events, &flushed);
                    self.close_text(&mut events);
                    events.push(other);
                }
                State::Inside { .. } => {
                    events.push(other);
                }
            },
        }
        events
    }

    fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        match std::mem::replace(&mut self.state, State::Outside) {
            State::Outside => {
                let flushed = std::mem::take(&mut self.buffer);
                self.emit_text(&mut events, &flushed);
            }
            State::Inside { open_tag_raw, .. } => {
                let remaining = std::mem::take(&mut self.buffer);
                self.emit_text(&mut events, &format!("{open_tag_raw}{remaining}"));
            }
        }
        self.close_text(&mut events);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol_types::JsonSchemaLike;
    use std::collections::HashMap;

    fn weather_tool() -> ToolDefinition {
        ToolDefinition::new(
            "get_weather",
            JsonSchemaLike::object(HashMap::from([(
                "location".to_string(),
                JsonSchemaLike { schema_type: Some("string".to_string()), ..Default::default() },
            )])),
        )
    }

    fn f_tool() -> ToolDefinition {
        ToolDefinition::new(
            "f",
            JsonSchemaLike::object(HashMap::from([(
                "x".to_string(),
                JsonSchemaLike { schema_type: Some("number".to_string()), ..Default::default() },
            )])),
        )
    }

    #[test]
    fn split_tag_across_chunks_scenario_6() {
        let mut parser = XmlStreamParser::new(vec![weather_tool()], heuristics::default_pipeline_config());
        let mut all = Vec::new();
        for chunk in ["Before <get_", "weather><location>Seoul</location></get_weather>", " after"] {
            all.extend(parser.push(StreamEvent::TextDelta { id: "h".to_string(), delta: chunk.to_string() }));
        }
        all.extend(parser.finish());

        let mut saw_tool_call = false;
        let mut text_concat = String::new();
        for ev in &all {
            match ev {
                StreamEvent::TextDelta { delta, .. } => text_concat.push_str(delta),
                StreamEvent::ToolCall { name, input, .. } => {
                    saw_tool_call = true;
                    assert_eq!(name, "get_weather");
                    assert_eq!(
                        serde_json::from_str::<serde_json::Value>(input).unwrap(),
                        serde_json::json!({"location": "Seoul"})
                    );
                }
                _ => {}
            }
        }
        assert!(saw_tool_call);
        assert_eq!(text_concat, "Before  after");
    }

    #[test]
    fn lookahead_withholds_at_most_l_minus_one_bytes() {
        let mut parser = XmlStreamParser::new(vec![f_tool()], heuristics::default_pipeline_config());
        let events = parser.push(StreamEvent::TextDelta { id: "h".to_string(), delta: "plain text <".to_string() });
        let flushed: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::TextDelta { delta, .. } => Some(delta.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(flushed, "plain text ");
    }

    #[test]
    fn unterminated_call_emitted_as_text_at_flush() {
        let mut parser = XmlStreamParser::new(vec![weather_tool()], heuristics::default_pipeline_config());
        parser.push(StreamEvent::TextDelta {
            id: "h".to_string(),
            delta: "<get_weather><location>Seoul".to_string(),
        });
        let events = parser.finish();
        let text: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::TextDelta { delta, .. } => Some(delta.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(text, "<get_weather><location>Seoul");
        assert!(!events.iter().any(|e| matches!(e, StreamEvent::ToolCall { .. })));
    }

    #[test]
    fn self_closing_tag_emits_immediately() {
        let tool = ToolDefinition::new("ping", JsonSchemaLike::object(HashMap::new()));
        let mut parser = XmlStreamParser::new(vec![tool], heuristics::default_pipeline_config());
        let events = parser.push(StreamEvent::TextDelta { id: "h".to_string(), delta: "go <ping/> now".to_string() });
        assert!(events.iter().any(|e| matches!(e, StreamEvent::ToolCall { input, .. } if input == "{}")));
    }

    #[test]
    fn self_closing_tag_split_across_chunks_is_withheld_not_flushed() {
        let tool = ToolDefinition::new("ping", JsonSchemaLike::object(HashMap::new()));
        let mut parser = XmlStreamParser::new(vec![tool], heuristics::default_pipeline_config());
        let mut events = parser.push(StreamEvent::TextDelta { id: "h".to_string(), delta: "go <ping/".to_string() });
        events.extend(parser.push(StreamEvent::TextDelta { id: "h".to_string(), delta: "> now".to_string() }));

        let flushed: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::TextDelta { delta, .. } => Some(delta.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(flushed, "go  now");
        assert!(events.iter().any(|e| matches!(e, StreamEvent::ToolCall { input, .. } if input == "{}")));
    }

    #[test]
    fn non_text_event_inside_call_is_forwarded_without_disturbing_buffer() {
        let mut parser = XmlStreamParser::new(vec![weather_tool()], heuristics::default_pipeline_config());
        parser.push(StreamEvent::TextDelta { id: "h".to_string(), delta: "<get_weather><location>Se".to_string() });
        let events = parser.push(StreamEvent::Finish { reason: "stop".to_string(), usage: None });
        assert!(matches!(events.last(), Some(StreamEvent::Finish { .. })));

        let rest = parser.push(StreamEvent::TextDelta {
            id: "h".to_string(),
            delta: "oul</location></get_weather>".to_string(),
        });
        assert!(rest.iter().any(|e| matches!(e, StreamEvent::ToolCall { .. })));
    }

    #[test]
    fn text_region_ids_pair_start_and_end() {
        let mut parser = XmlStreamParser::new(vec![weather_tool()], heuristics::default_pipeline_config());
        let events = parser.push(StreamEvent::TextDelta { id: "h".to_string(), delta: "hi there".to_string() });
        let all = [events, parser.finish()].concat();
        assert!(matches!(all[0], StreamEvent::TextStart { .. }));
        assert!(matches!(all.last().unwrap(), StreamEvent::TextEnd { .. }));
    }
}
