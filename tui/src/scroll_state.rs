/// Selection and scroll position for a vertical list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    pub selected_idx: Option<usize>,
    pub scroll_top: usize,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.selected_idx = None;
        self.scroll_top = 0;
    }

    /// Select the first row when there is one and nothing is selected.
    pub fn clamp_selection(&mut self, len: usize) {
        self.selected_idx = match self.selected_idx {
            _ if len == 0 => None,
            Some(idx) => Some(idx.min(len - 1)),
            None => Some(0),
        };
        if len == 0 {
            self.scroll_top = 0;
        }
    }

    pub fn move_up_wrap(&mut self, len: usize) {
        if len == 0 {
            self.reset();
            return;
        }
        self.selected_idx = Some(match self.selected_idx {
            Some(idx) if idx > 0 => idx - 1,
            _ => len - 1,
        });
    }

    pub fn move_down_wrap(&mut self, len: usize) {
        if len == 0 {
            self.reset();
            return;
        }
        self.selected_idx = Some(match self.selected_idx {
            Some(idx) if idx + 1 < len => idx + 1,
            _ => 0,
        });
    }

    /// Scroll so the selected row is inside a window of `visible_rows`.
    pub fn ensure_visible(&mut self, len: usize, visible_rows: usize) {
        if len == 0 || visible_rows == 0 {
            self.scroll_top = 0;
            return;
        }
        if let Some(sel) = self.selected_idx {
            if sel < self.scroll_top {
                self.scroll_top = sel;
            } else if sel >= self.scroll_top + visible_rows {
                self.scroll_top = sel + 1 - visible_rows;
            }
        } else {
            self.scroll_top = 0;
        }
    }
}
