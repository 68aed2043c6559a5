//! Markdown and toolbar-mention insertion around the current selection.

use strum_macros::AsRefStr;
use strum_macros::EnumIter;
use strum_macros::EnumString;
use strum_macros::IntoStaticStr;

use crate::selection::Selection;

/// Inline styles offered by the markdown toolbar.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum MarkdownStyle {
    // Enum order is toolbar order.
    Bold,
    Italic,
    Strike,
    Code,
    CodeBlock,
}

impl MarkdownStyle {
    /// The delimiter written on both sides of the selection.
    pub fn token(self) -> &'static str {
        match self {
            MarkdownStyle::Bold => "*",
            MarkdownStyle::Italic => "_",
            MarkdownStyle::Strike => "~",
            MarkdownStyle::Code => "`",
            MarkdownStyle::CodeBlock => "```",
        }
    }

    /// Style name without decoration, e.g. `code-block`.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Result of a text rewrite: the new text and where the cursor goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub text: String,
    pub selection: Selection,
}

/// Wrap the selected range of `text` in the style's delimiter.
///
/// For a selection `[s, e)` and delimiter `T` the result is
/// `text[..s] + T + text[s..e] + T + text[e..]`. The new selection starts right
/// after the opening delimiter and, for a non-empty selection, still covers
/// the wrapped text.
pub fn wrap_selection(text: &str, selection: Selection, style: MarkdownStyle) -> Splice {
    let token = style.token();
    surround(text, selection, token, token)
}

/// Insert an `@` in front of the selection, as the toolbar mention button does.
pub fn insert_mention_marker(text: &str, selection: Selection) -> Splice {
    surround(text, selection, "@", "")
}

fn surround(text: &str, selection: Selection, open: &str, close: &str) -> Splice {
    let Selection { start, end } = selection.clamp_to(text);
    let mut new_text = String::with_capacity(text.len() + open.len() + close.len());
    new_text.push_str(&text[..start]);
    new_text.push_str(open);
    new_text.push_str(&text[start..end]);
    new_text.push_str(close);
    new_text.push_str(&text[end..]);

    let selection_end = if start == end { start } else { end };
    Splice {
        text: new_text,
        selection: Selection::new(start + open.len(), selection_end + open.len()),
    }
}
