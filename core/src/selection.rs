//! Cursor selection over the draft text.
//!
//! Offsets are byte offsets into a UTF-8 string. Every selection handed out by
//! the composer satisfies `start <= end <= text.len()` with both ends on char
//! boundaries; [`Selection::clamp_to`] restores that after a text rewrite.

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Build a selection, ordering the ends so that `start <= end`.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// A collapsed selection (plain caret) at `pos`.
    pub const fn caret(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// The caret position used for autocomplete: the far end of the selection.
    pub fn cursor(self) -> usize {
        self.start.max(self.end)
    }

    pub fn is_collapsed(self) -> bool {
        self.start == self.end
    }

    /// Clamp both ends into `text`, snapping back to the nearest char boundary.
    pub fn clamp_to(self, text: &str) -> Self {
        Self::new(
            clamp_to_char_boundary(text, self.start),
            clamp_to_char_boundary(text, self.end),
        )
    }
}

/// Clamp `offset` to `text.len()` and move it back onto a char boundary.
pub fn clamp_to_char_boundary(text: &str, offset: usize) -> usize {
    let mut pos = offset.min(text.len());
    while pos > 0 && !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}
