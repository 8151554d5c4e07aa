//! Balance-aware text scanning helpers.
//!
//! The refiner and the conditional tree builder both pull conditions and
//! brace bodies out of raw statement text. Doing this with non-greedy
//! regexes breaks as soon as a condition or body nests its own delimiters,
//! so extraction here is done by explicit depth scanning over char
//! boundaries.

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn char_at(text: &str, at: usize) -> Option<char> {
    text.get(at..).and_then(|rest| rest.chars().next())
}

/// First non-whitespace byte index at or after `from`.
pub(crate) fn skip_whitespace(text: &str, from: usize) -> usize {
    text[from..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| from + i)
        .unwrap_or(text.len())
}

/// Whether `word` occurs at exactly `at`, bounded by non-word characters.
/// The comparison is case-insensitive; `word` must be ASCII.
pub(crate) fn word_at(text: &str, word: &str, at: usize) -> bool {
    let end = at + word.len();
    if end > text.len() || !text.is_char_boundary(at) || !text.is_char_boundary(end) {
        return false;
    }
    if !text[at..end].eq_ignore_ascii_case(word) {
        return false;
    }
    let before_ok = text[..at].chars().next_back().map_or(true, |c| !is_word_char(c));
    let after_ok = char_at(text, end).map_or(true, |c| !is_word_char(c));
    before_ok && after_ok
}

/// Case-insensitive word search from `from`, at word boundaries only.
pub(crate) fn find_word(text: &str, word: &str, from: usize) -> Option<usize> {
    let mut at = from;
    while at + word.len() <= text.len() {
        if text.is_char_boundary(at) && word_at(text, word, at) {
            return Some(at);
        }
        at += 1;
    }
    None
}

/// Byte index of the delimiter closing the one opened at `open_at`.
///
/// `text` must carry `open` at `open_at`; returns `None` when the construct
/// never closes.
pub(crate) fn matching(text: &str, open_at: usize, open: char, close: char) -> Option<usize> {
    debug_assert_eq!(char_at(text, open_at), Some(open));
    let mut depth = 0usize;
    for (i, c) in text[open_at..].char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(open_at + i);
            }
        }
    }
    None
}

/// Whether an `if (...)`-shaped construct begins at `at`.
pub(crate) fn if_construct_at(text: &str, at: usize) -> bool {
    word_at(text, "if", at) && char_at(text, skip_whitespace(text, at + 2)) == Some('(')
}

/// The pieces of one `if (cond) { body } [else ...]` construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IfParts {
    pub condition: String,
    pub if_body: String,
    pub else_body: Option<String>,
    /// Byte index just past the construct (past the final `}`).
    pub end: usize,
}

/// Parses the construct beginning at `at`; `None` when it is malformed
/// (missing parenthesis, missing brace, unterminated body).
///
/// An `else if` suffix is treated as an `else` whose body is the nested
/// construct itself, so `if a {..} else if b {..}` and
/// `if a {..} else { if b {..} }` decompose the same way.
pub(crate) fn parse_if_construct(text: &str, at: usize) -> Option<IfParts> {
    if !word_at(text, "if", at) {
        return None;
    }
    let open = skip_whitespace(text, at + 2);
    if char_at(text, open) != Some('(') {
        return None;
    }
    let close = matching(text, open, '(', ')')?;
    let condition = text[open + 1..close].to_string();

    let brace = skip_whitespace(text, close + 1);
    if char_at(text, brace) != Some('{') {
        return None;
    }
    let brace_close = matching(text, brace, '{', '}')?;
    let if_body = text[brace + 1..brace_close].to_string();

    let mut end = brace_close + 1;
    let mut else_body = None;
    let else_at = skip_whitespace(text, end);
    if word_at(text, "else", else_at) {
        let after_else = skip_whitespace(text, else_at + 4);
        if char_at(text, after_else) == Some('{') {
            let else_close = matching(text, after_else, '{', '}')?;
            else_body = Some(text[after_else + 1..else_close].to_string());
            end = else_close + 1;
        } else if if_construct_at(text, after_else) {
            let nested = parse_if_construct(text, after_else)?;
            else_body = Some(text[after_else..nested.end].to_string());
            end = nested.end;
        } else {
            return None;
        }
    }

    Some(IfParts {
        condition,
        if_body,
        else_body,
        end,
    })
}
