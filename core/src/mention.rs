//! Matching of the in-progress autocomplete query around the cursor.

use regex_lite::Regex;
use std::sync::LazyLock;

/// Characters that open an autocomplete popup when they start a token.
pub const TRIGGER_MARKERS: [char; 5] = ['@', '#', ':', '/', '!'];

// The query typed after a marker: the trailing run of characters that are
// neither whitespace nor a marker. The marker itself is not part of it.
static MENTION_QUERY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"[^@:#/!\s]*$"));

fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        // Panic is ok thanks to `load_regex` test.
        Err(err) => panic!("invalid regex pattern `{pattern}`: {err}"),
    }
}

/// Remove the in-progress query from the end of `before_cursor`.
///
/// `"hello @jo"` becomes `"hello @"`, `"say :smi"` becomes `"say :"`.
pub fn strip_query(before_cursor: &str) -> &str {
    match MENTION_QUERY_REGEX.find(before_cursor) {
        Some(m) => &before_cursor[..m.start()],
        None => before_cursor,
    }
}

/// The whitespace-delimited token that ends at `cursor`.
///
/// Returns an empty string when the cursor sits right after whitespace or at
/// the start of the text.
pub fn last_token(text: &str, cursor: usize) -> &str {
    let cursor = crate::selection::clamp_to_char_boundary(text, cursor);
    let before_cursor = &text[..cursor];
    let start = before_cursor
        .char_indices()
        .rfind(|(_, c)| c.is_whitespace())
        .map(|(idx, c)| idx + c.len_utf8())
        .unwrap_or(0);
    &before_cursor[start..]
}
