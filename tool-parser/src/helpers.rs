//! Small utilities shared across protocols and heuristics.

/// Escape every regex metacharacter in `s` so it can be embedded
/// literally in a pattern (spec §9 open question (a): two subtly
/// different escapers existed upstream; this is the one canonical
/// version — the standard metacharacter set).
pub fn escape_regex_metacharacters(s: &str) -> String {
    const METACHARS: &[char] = &[
        '.', '^', '$', '*', '+', '?', '(', ')', '[', ']', '{', '}', '|', '\\', '/',
    ];
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if METACHARS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Does `buffer` end with a non-empty proper prefix of `token`? Used by
/// streaming state machines to decide how many trailing bytes must stay
/// buffered rather than be flushed as text (spec §4.1 "Lookahead
/// discipline", §4.2 "Partial-marker awareness").
///
/// Returns the length of the longest such prefix, or `None` if the
/// buffer doesn't end with any proper prefix of `token`.
pub fn ends_with_partial_token(buffer: &str, token: &str) -> Option<usize> {
    let max_len = token.len().saturating_sub(1).min(buffer.len());
    for len in (1..=max_len).rev() {
        if !buffer.is_char_boundary(buffer.len() - len) {
            continue;
        }
        let tail = &buffer[buffer.len() - len..];
        if token.starts_with(tail) {
            return Some(len);
        }
    }
    None
}

/// The longest of several tokens' lengths, used to derive `L` for the
/// XML protocol's lookahead bound (spec §4.1).
pub fn max_len<'a>(tokens: impl IntoIterator<Item = &'a str>) -> usize {
    tokens.into_iter().map(|t| t.len()).max().unwrap_or(0)
}
