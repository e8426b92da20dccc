//! `balance-tags` (spec §4.3): walk the normalized text with an
//! explicit tag stack, inserting a missing `</step>` before a `<step>`
//! that directly follows `</status>`, and emitting synthetic closes for
//! any tags left on the stack at EOF. Sets `reparse = true` whenever it
//! changes anything.

use crate::types::{Heuristic, HeuristicOutcome, IntermediateCall, Phase};
use crate::xml_walk::{is_name_char, is_name_start, skip_special};

#[derive(Debug, Clone, PartialEq)]
enum Tok<'a> {
    Open { name: &'a str, raw: &'a str },
    Close { name: &'a str, raw: &'a str },
    SelfClosing { raw: &'a str },
    Special { raw: &'a str },
    Text { raw: &'a str },
}

fn next_token(text: &str, from: usize) -> Option<(Tok<'_>, usize)> {
    if from >= text.len() {
        return None;
    }
    let bytes = text.as_bytes();
    if bytes[from] != b'<' {
        let rel = text[from..].find('<').unwrap_or(text.len() - from);
        return Some((Tok::Text { raw: &text[from..from + rel] }, from + rel));
    }

    match text[from + 1..].chars().next() {
        Some('!') | Some('?') => {
            let end = skip_special(text, from);
            Some((Tok::Special { raw: &text[from..end] }, end))
        }
        Some('/') => {
            let after_slash = from + 2;
            let rest = &text[after_slash..];
            let trimmed = rest.trim_start();
            let name_begin = after_slash + (rest.len() - trimmed.len());
            let Some(first) = text[name_begin..].chars().next() else {
                return Some((Tok::Text { raw: &text[from..from + 1] }, from + 1));
            };
            if !is_name_start(first) {
                return Some((Tok::Text { raw: &text[from..from + 1] }, from + 1));
            }
            let mut name_end = name_begin + first.len_utf8();
            for c in text[name_end..].chars() {
                if is_name_char(c) {
                    name_end += c.len_utf8();
                } else {
                    break;
                }
            }
            let gt = text[name_end..].find('>')?;
            let tag_end = name_end + gt + 1;
            Some((
                Tok::Close { name: &text[name_begin..name_end], raw: &text[from..tag_end] },
                tag_end,
            ))
        }
        Some(c) if is_name_start(c) => {
            let name_begin = from + 1;
            let mut name_end = name_begin + c.len_utf8();
            for ch in text[name_end..].chars() {
                if is_name_char(ch) {
                    name_end += ch.len_utf8();
                } else {
                    break;
                }
            }
            let gt = text[name_end..].find('>')?;
            let tag_inner = &text[name_end..name_end + gt];
            let tag_end = name_end + gt + 1;
            if tag_inner.trim_end().ends_with('/') {
                Some((Tok::SelfClosing { raw: &text[from..tag_end] }, tag_end))
            } else {
                Some((
                    Tok::Open { name: &text[name_begin..name_end], raw: &text[from..tag_end] },
                    tag_end,
                ))
            }
        }
        _ => Some((Tok::Text { raw: &text[from..from + 1] }, from + 1)),
    }
}

fn rebalance(text: &str) -> (String, bool) {
    let mut out = String::with_capacity(text.len());
    let mut stack: Vec<String> = Vec::new();
    let mut changed = false;
    let mut pos = 0;
    let mut last_closed: Option<String> = None;

    while let Some((tok, next)) = next_token(text, pos) {
        match tok {
            Tok::Open { name, raw } => {
                if name == "step" && last_closed.as_deref() == Some("status") && stack.last().map(String::as_str) == Some("step") {
                    out.push_str("</step>");
                    stack.pop();
                    changed = true;
                }
                stack.push(name.to_string());
                out.push_str(raw);
                last_closed = None;
            }
            Tok::Close { name, raw } => {
                if stack.iter().any(|n| n == name) {
                    // Close whatever malformed nesting sits on top first.
                    while stack.last().map(String::as_str) != Some(name) {
                        let Some(top) = stack.pop() else { break };
                        out.push_str("</");
                        out.push_str(&top);
                        out.push('>');
                        changed = true;
                    }
                    stack.pop();
                }
                out.push_str(raw);
                last_closed = Some(name.to_string());
            }
            Tok::SelfClosing { raw } | Tok::Special { raw } | Tok::Text { raw } => {
                out.push_str(raw);
                last_closed = None;
            }
        }
        pos = next;
    }

    while let Some(top) = stack.pop() {
        out.push_str("</");
        out.push_str(&top);
        out.push('>');
        changed = true;
    }

    (out, changed)
}

pub struct BalanceTags;

impl Heuristic for BalanceTags {
    fn id(&self) -> &str {
        "balance-tags"
    }

    fn phase(&self) -> Phase {
        Phase::FallbackReparse
    }

    fn applies(&self, ctx: &IntermediateCall) -> bool {
        rebalance(&ctx.raw_segment).1
    }

    fn run(&self, ctx: &mut IntermediateCall) -> HeuristicOutcome {
        let (rebalanced, changed) = rebalance(&ctx.raw_segment);
        ctx.raw_segment = rebalanced;
        HeuristicOutcome { reparse: changed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closes_unterminated_tag_at_eof() {
        let (out, changed) = rebalance("<a>hi");
        assert_eq!(out, "<a>hi</a>");
        assert!(changed);
    }

    #[test]
    fn inserts_missing_step_close_before_next_step() {
        let (out, changed) = rebalance("<step>one</status><step>two</step>");
        assert_eq!(out, "<step>one</status></step><step>two</step>");
        assert!(changed);
    }

    #[test]
    fn leaves_balanced_text_unchanged() {
        let (out, changed) = rebalance("<a><b>1</b></a>");
        assert_eq!(out, "<a><b>1</b></a>");
        assert!(!changed);
    }
}
