use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Widget;
use relay_core::autocomplete::AutocompleteItem;

use crate::render::Renderable;
use crate::scroll_state::ScrollState;

/// Rows shown at once; longer lists scroll.
pub const MAX_POPUP_ROWS: usize = 6;

/// Suggestion list shown above the composer while a trigger is active.
#[derive(Debug, Default)]
pub struct AutocompletePopup {
    items: Vec<AutocompleteItem>,
    state: ScrollState,
}

impl AutocompletePopup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_items(&mut self, items: Vec<AutocompleteItem>) {
        self.items = items;
        self.state.reset();
        self.state.clamp_selection(self.items.len());
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.state.reset();
    }

    pub fn items(&self) -> &[AutocompleteItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn move_up(&mut self) {
        self.state.move_up_wrap(self.items.len());
        self.state.ensure_visible(self.items.len(), MAX_POPUP_ROWS);
    }

    pub fn move_down(&mut self) {
        self.state.move_down_wrap(self.items.len());
        self.state.ensure_visible(self.items.len(), MAX_POPUP_ROWS);
    }

    pub fn selected_item(&self) -> Option<&AutocompleteItem> {
        self.state.selected_idx.and_then(|idx| self.items.get(idx))
    }

    fn row(item: &AutocompleteItem, selected: bool) -> Line<'static> {
        let prefix = if selected { "› " } else { "  " };
        let mut spans: Vec<Span<'static>> = vec![prefix.into()];
        let title = item.title();
        spans.push(if selected {
            title.cyan().bold()
        } else {
            title.into()
        });
        if let Some(subtitle) = item.subtitle() {
            spans.push("  ".into());
            spans.push(subtitle.dim());
        }
        if matches!(item, AutocompleteItem::Loading) {
            return Line::from(spans).italic();
        }
        Line::from(spans)
    }
}

impl Renderable for AutocompletePopup {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        if self.items.is_empty() || area.height == 0 {
            return;
        }
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::new().dim());
        let inner = block.inner(area);
        block.render(area, buf);

        let visible = usize::from(inner.height);
        for (row, (idx, item)) in self
            .items
            .iter()
            .enumerate()
            .skip(self.state.scroll_top)
            .take(visible)
            .enumerate()
        {
            let selected = self.state.selected_idx == Some(idx);
            let y = inner.y + u16::try_from(row).unwrap_or(u16::MAX);
            Self::row(item, selected).render(Rect::new(inner.x, y, inner.width, 1), buf);
        }
    }

    fn desired_height(&self, _width: u16) -> u16 {
        if self.items.is_empty() {
            return 0;
        }
        let rows = self.items.len().min(MAX_POPUP_ROWS);
        u16::try_from(rows).unwrap_or(u16::MAX) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn emoji(name: &str) -> AutocompleteItem {
        AutocompleteItem::Emoji {
            name: name.to_string(),
        }
    }

    fn rendered_rows(popup: &AutocompletePopup, width: u16) -> Vec<String> {
        let height = popup.desired_height(width);
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        popup.render(area, &mut buf);
        (1..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn first_item_is_selected_and_selection_wraps() {
        let mut popup = AutocompletePopup::new();
        popup.set_items(vec![emoji("smile"), emoji("sob")]);
        assert_eq!(popup.selected_item(), Some(&emoji("smile")));

        popup.move_up();
        assert_eq!(popup.selected_item(), Some(&emoji("sob")));
        popup.move_down();
        assert_eq!(popup.selected_item(), Some(&emoji("smile")));
    }

    #[test]
    fn renders_titles_with_a_selection_marker() {
        let mut popup = AutocompletePopup::new();
        popup.set_items(vec![emoji("smile"), emoji("sob")]);
        assert_eq!(rendered_rows(&popup, 20), vec!["› :smile:", "  :sob:"]);
    }

    #[test]
    fn long_lists_scroll_to_keep_selection_visible() {
        let mut popup = AutocompletePopup::new();
        popup.set_items((0..10).map(|i| emoji(&format!("e{i}"))).collect());
        assert_eq!(popup.desired_height(20), 7);

        popup.move_up();
        let rows = rendered_rows(&popup, 20);
        assert_eq!(rows.last().map(String::as_str), Some("› :e9:"));
        assert_eq!(rows.first().map(String::as_str), Some("  :e4:"));
    }

    #[test]
    fn empty_popup_takes_no_space() {
        let popup = AutocompletePopup::new();
        assert_eq!(popup.desired_height(20), 0);
        assert_eq!(popup.selected_item(), None);
    }
}
