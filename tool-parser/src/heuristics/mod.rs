//! The heuristic engine (spec §4.3): runs ordered repair heuristics
//! around a single underlying parse of a raw XML segment, re-entering
//! the parse step a bounded number of times.

pub mod balance_tags;
pub mod dedupe_shell_string_tags;
pub mod escape_invalid_lt;
pub mod normalize_close_tags;
pub mod repair_against_schema;

use std::sync::Arc;

use crate::types::{HeuristicRef, IntermediateCall, PipelineConfig};
use crate::xml_tokenizer;

/// The five default heuristics wired into their default phases (spec
/// §4.3 "Default pipeline").
pub fn default_pipeline_config() -> PipelineConfig {
    PipelineConfig {
        pre_parse: vec![
            Arc::new(normalize_close_tags::NormalizeCloseTags) as HeuristicRef,
            Arc::new(escape_invalid_lt::EscapeInvalidLt) as HeuristicRef,
        ],
        fallback_reparse: vec![
            Arc::new(balance_tags::BalanceTags) as HeuristicRef,
            Arc::new(dedupe_shell_string_tags::DedupeShellStringTags) as HeuristicRef,
        ],
        post_parse: vec![Arc::new(repair_against_schema::RepairAgainstSchema) as HeuristicRef],
        max_reparses: 2,
    }
}

fn attempt_parse(ctx: &mut IntermediateCall) {
    match xml_tokenizer::parse(&ctx.raw_segment, &ctx.schema) {
        Ok(value) => ctx.parsed = Some(value),
        Err(e) => ctx.errors.push(e.to_string()),
    }
}

/// Run the full pipeline (spec §4.3 "Algorithm") over one raw segment,
/// returning the resulting `IntermediateCall`. `ctx.parsed` is `None`
/// on failure; callers fall back to emitting the original text.
pub fn run_pipeline(config: &PipelineConfig, mut ctx: IntermediateCall) -> IntermediateCall {
    for heuristic in &config.pre_parse {
        if heuristic.applies(&ctx) {
            heuristic.run(&mut ctx);
        }
    }

    attempt_parse(&mut ctx);

    if ctx.parsed.is_none() {
        for _ in 0..config.max_reparses {
            if ctx.parsed.is_some() {
                break;
            }
            let mut should_reparse = false;
            for heuristic in &config.fallback_reparse {
                if heuristic.applies(&ctx) {
                    let outcome = heuristic.run(&mut ctx);
                    should_reparse |= outcome.reparse;
                }
            }
            if !should_reparse {
                break;
            }
            attempt_parse(&mut ctx);
        }
    }

    if ctx.parsed.is_some() {
        for heuristic in &config.post_parse {
            if heuristic.applies(&ctx) {
                heuristic.run(&mut ctx);
            }
        }
    }

    ctx
}
