//! Core pipeline types shared by the heuristic engine, the coercer, and
//! both protocols (spec §3 "Intermediate call (pipeline state)" and
//! "Pipeline configuration").

use std::fmt;
use std::sync::Arc;

use protocol_types::JsonSchemaLike;
use serde_json::Value;

/// Which of the three ordered phases a heuristic runs in (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PreParse,
    FallbackReparse,
    PostParse,
}

/// Extra context a heuristic may need beyond the raw segment and schema
/// (spec §3: `meta.originalContent` "preserves the initial raw text for
/// safety checks in fallback heuristics").
#[derive(Debug, Clone, Default)]
pub struct CallMeta {
    pub original_content: String,
}

/// Mutable pipeline state for one tool-call region as it moves through
/// preParse → parse → fallbackReparse loop → postParse.
#[derive(Debug, Clone)]
pub struct IntermediateCall {
    pub tool_name: String,
    pub schema: JsonSchemaLike,
    pub raw_segment: String,
    pub parsed: Option<Value>,
    pub errors: Vec<String>,
    pub meta: CallMeta,
}

impl IntermediateCall {
    pub fn new(tool_name: impl Into<String>, schema: JsonSchemaLike, raw_segment: impl Into<String>) -> Self {
        let raw_segment = raw_segment.into();
        Self {
            tool_name: tool_name.into(),
            schema,
            meta: CallMeta {
                original_content: raw_segment.clone(),
            },
            raw_segment,
            parsed: None,
            errors: Vec::new(),
        }
    }
}

/// What a heuristic's `run` did to the call state (spec §4.3: "result
/// may set a new rawSegment, set parsed, and/or request a reparse").
#[derive(Debug, Clone, Default)]
pub struct HeuristicOutcome {
    pub reparse: bool,
}

/// A single named, phase-scoped repair step (spec §9 "Heuristic
/// extensibility": "tagged records with function-valued fields").
pub trait Heuristic: Send + Sync {
    fn id(&self) -> &str;
    fn phase(&self) -> Phase;
    /// Must be pure and cheap (spec §9).
    fn applies(&self, ctx: &IntermediateCall) -> bool;
    fn run(&self, ctx: &mut IntermediateCall) -> HeuristicOutcome;
}

impl fmt::Debug for dyn Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Heuristic({})", self.id())
    }
}

pub type HeuristicRef = Arc<dyn Heuristic>;

/// The three ordered, phase-keyed heuristic lists plus the reparse
/// ceiling (spec §3 "Pipeline configuration", §4.3 "Default pipeline").
#[derive(Clone)]
pub struct PipelineConfig {
    pub pre_parse: Vec<HeuristicRef>,
    pub fallback_reparse: Vec<HeuristicRef>,
    pub post_parse: Vec<HeuristicRef>,
    pub max_reparses: usize,
}

impl PipelineConfig {
    /// Append user-provided heuristics to the matching phase list
    /// (spec §9: "merge into the default pipeline by phase (append to
    /// each list)").
    pub fn merge_heuristics(&mut self, extra: impl IntoIterator<Item = HeuristicRef>) {
        for h in extra {
            match h.phase() {
                Phase::PreParse => self.pre_parse.push(h),
                Phase::FallbackReparse => self.fallback_reparse.push(h),
                Phase::PostParse => self.post_parse.push(h),
            }
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("pre_parse", &self.pre_parse.iter().map(|h| h.id()).collect::<Vec<_>>())
            .field(
                "fallback_reparse",
                &self.fallback_reparse.iter().map(|h| h.id()).collect::<Vec<_>>(),
            )
            .field("post_parse", &self.post_parse.iter().map(|h| h.id()).collect::<Vec<_>>())
            .field("max_reparses", &self.max_reparses)
            .finish()
    }
}
