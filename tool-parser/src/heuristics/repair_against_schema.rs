//! `repair-against-schema` (spec §4.3 postParse): runs the schema
//! coercer over `parsed` and replaces it if the result differs.

use crate::coercion;
use crate::types::{Heuristic, HeuristicOutcome, IntermediateCall, Phase};

pub struct RepairAgainstSchema;

impl Heuristic for RepairAgainstSchema {
    fn id(&self) -> &str {
        "repair-against-schema"
    }

    fn phase(&self) -> Phase {
        Phase::PostParse
    }

    fn applies(&self, ctx: &IntermediateCall) -> bool {
        ctx.parsed.is_some()
    }

    fn run(&self, ctx: &mut IntermediateCall) -> HeuristicOutcome {
        if let Some(parsed) = &ctx.parsed {
            let repaired = coercion::coerce(parsed, &ctx.schema);
            if repaired != *parsed {
                ctx.parsed = Some(repaired);
            }
        }
        HeuristicOutcome::default()
    }
}
