//! `normalize-close-tags` (spec §4.3): replace any `</<ws>*name<ws>*>`
//! with `</name>`. Always applies.

use crate::types::{Heuristic, HeuristicOutcome, IntermediateCall, Phase};
use crate::xml_walk::{is_name_char, is_name_start};

pub struct NormalizeCloseTags;

pub(crate) fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'<' || text[i + 1..].chars().next() != Some('/') {
            let ch_len = text[i..].chars().next().map(|c| c.len_utf8()).unwrap_or(1);
            out.push_str(&text[i..i + ch_len]);
            i += ch_len;
            continue;
        }

        let after_slash = i + 2;
        let rest = &text[after_slash..];
        let trimmed_start = rest.trim_start();
        let leading_ws = rest.len() - trimmed_start.len();
        let name_begin = after_slash + leading_ws;

        let Some(first) = text[name_begin..].chars().next() else {
            out.push_str(&text[i..]);
            break;
        };
        if !is_name_start(first) {
            out.push_str("</");
            i = after_slash;
            continue;
        }

        let mut name_end = name_begin + first.len_utf8();
        for c in text[name_end..].chars() {
            if is_name_char(c) {
                name_end += c.len_utf8();
            } else {
                break;
            }
        }
        let name = &text[name_begin..name_end];

        let after_name = &text[name_end..];
        let trimmed_after = after_name.trim_start();
        let trailing_ws = after_name.len() - trimmed_after.len();
        if trimmed_after.starts_with('>') {
            out.push_str("</");
            out.push_str(name);
            out.push('>');
            i = name_end + trailing_ws + 1;
        } else {
            // Not a well-formed close tag after all; copy verbatim.
            out.push_str(&text[i..name_end]);
            i = name_end;
        }
    }
    out
}

impl Heuristic for NormalizeCloseTags {
    fn id(&self) -> &str {
        "normalize-close-tags"
    }

    fn phase(&self) -> Phase {
        Phase::PreParse
    }

    fn applies(&self, _ctx: &IntermediateCall) -> bool {
        true
    }

    fn run(&self, ctx: &mut IntermediateCall) -> HeuristicOutcome {
        ctx.raw_segment = normalize(&ctx.raw_segment);
        HeuristicOutcome::default()
    }
}
