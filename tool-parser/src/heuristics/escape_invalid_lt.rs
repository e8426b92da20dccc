//! `escape-invalid-lt` (spec §4.3): replace every `<` whose next
//! character is not one of `[A-Za-z0-9_:-]`, `/`, `!`, `?` with `&lt;`.
//! Always applies.

use crate::types::{Heuristic, HeuristicOutcome, IntermediateCall, Phase};

fn is_valid_lt_follower(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '-' | '/' | '!' | '?')
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c == '<' {
            let next_ok = chars
                .peek()
                .map(|(_, nc)| is_valid_lt_follower(*nc))
                .unwrap_or(false);
            if next_ok {
                out.push('<');
            } else {
                out.push_str("&lt;");
            }
        } else {
            out.push(c);
        }
    }
    out
}

pub struct EscapeInvalidLt;

impl Heuristic for EscapeInvalidLt {
    fn id(&self) -> &str {
        "escape-invalid-lt"
    }

    fn phase(&self) -> Phase {
        Phase::PreParse
    }

    fn applies(&self, _ctx: &IntermediateCall) -> bool {
        true
    }

    fn run(&self, ctx: &mut IntermediateCall) -> HeuristicOutcome {
        ctx.raw_segment = escape(&ctx.raw_segment);
        HeuristicOutcome::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_bare_less_than() {
        assert_eq!(escape("a < b"), "a &lt; b");
    }

    #[test]
    fn leaves_real_tags_alone() {
        assert_eq!(escape("<a>1 < 2</a>"), "<a>1 &lt; 2</a>");
    }

    #[test]
    fn leaves_close_and_special_tags_alone() {
        assert_eq!(escape("</a><!--c--><?pi?>"), "</a><!--c--><?pi?>");
    }
}
