//! `dedupe-shell-string-tags` (spec §4.3): for shell-like tools (a
//! `command` property typed as an array), keep only the last occurrence
//! of each duplicated string-typed top-level sibling tag, collapsing
//! the text between the kept occurrences to empty.

use crate::schema_utils::{looks_like_shell_tool, string_properties};
use crate::types::{Heuristic, HeuristicOutcome, IntermediateCall, Phase};
use crate::xml_walk::{find_balanced_close, find_next_open_tag};

fn dedupe_one(text: &str, name: &str) -> (String, bool) {
    let names = [name];
    let mut spans = Vec::new();
    let mut pos = 0;
    while let Some(open) = find_next_open_tag(text, pos, Some(&names)) {
        if open.self_closing {
            spans.push((open.start, open.tag_end));
            pos = open.tag_end;
            continue;
        }
        match find_balanced_close(text, &open.name, open.tag_end) {
            Some((_, after)) => {
                spans.push((open.start, after));
                pos = after;
            }
            None => break,
        }
    }

    if spans.len() <= 1 {
        return (text.to_string(), false);
    }

    let last = *spans.last().unwrap();
    let mut out = String::with_capacity(text.len());
    let mut prev_end = 0;
    for (start, end) in &spans {
        out.push_str(&text[prev_end..*start]);
        if (*start, *end) == last {
            out.push_str(&text[*start..*end]);
        }
        // earlier occurrences: the tag itself is dropped; any text
        // between dropped occurrences is also collapsed to empty.
        prev_end = *end;
    }
    out.push_str(&text[prev_end..]);
    (out, true)
}

pub struct DedupeShellStringTags;

impl Heuristic for DedupeShellStringTags {
    fn id(&self) -> &str {
        "dedupe-shell-string-tags"
    }

    fn phase(&self) -> Phase {
        Phase::FallbackReparse
    }

    fn applies(&self, ctx: &IntermediateCall) -> bool {
        if !looks_like_shell_tool(&ctx.schema) {
            return false;
        }
        string_properties(&ctx.schema)
            .into_iter()
            .any(|name| dedupe_one(&ctx.raw_segment, name).1)
    }

    fn run(&self, ctx: &mut IntermediateCall) -> HeuristicOutcome {
        let mut changed = false;
        for name in string_properties(&ctx.schema).into_iter().map(str::to_string).collect::<Vec<_>>() {
            let (deduped, this_changed) = dedupe_one(&ctx.raw_segment, &name);
            ctx.raw_segment = deduped;
            changed |= this_changed;
        }
        HeuristicOutcome { reparse: changed }
    }
}
