//! The markdown toolbar: a close button followed by one button per style.

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Widget;
use relay_core::markdown::MarkdownStyle;
use strum::IntoEnumIterator;

use crate::composer_input::ComposerEvent;
use crate::render::Renderable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarButton {
    Close,
    Style(MarkdownStyle),
}

impl ToolbarButton {
    /// Buttons in display order.
    pub fn all() -> impl Iterator<Item = ToolbarButton> {
        std::iter::once(ToolbarButton::Close)
            .chain(MarkdownStyle::iter().map(ToolbarButton::Style))
    }

    pub fn label(self) -> &'static str {
        match self {
            ToolbarButton::Close => "✕",
            ToolbarButton::Style(MarkdownStyle::Bold) => "B",
            ToolbarButton::Style(MarkdownStyle::Italic) => "I",
            ToolbarButton::Style(MarkdownStyle::Strike) => "S",
            ToolbarButton::Style(MarkdownStyle::Code) => "</>",
            ToolbarButton::Style(MarkdownStyle::CodeBlock) => "```",
        }
    }

    /// `Alt+<key>` shortcut.
    pub fn shortcut(self) -> char {
        match self {
            ToolbarButton::Close => 'x',
            ToolbarButton::Style(MarkdownStyle::Bold) => 'b',
            ToolbarButton::Style(MarkdownStyle::Italic) => 'i',
            ToolbarButton::Style(MarkdownStyle::Strike) => 's',
            ToolbarButton::Style(MarkdownStyle::Code) => 'c',
            ToolbarButton::Style(MarkdownStyle::CodeBlock) => 'k',
        }
    }

    pub fn for_key(key_event: KeyEvent) -> Option<ToolbarButton> {
        let KeyCode::Char(c) = key_event.code else {
            return None;
        };
        if key_event.modifiers != KeyModifiers::ALT {
            return None;
        }
        let c = c.to_ascii_lowercase();
        Self::all().find(|button| button.shortcut() == c)
    }

    fn styled_label(self) -> Span<'static> {
        let label = self.label();
        match self {
            ToolbarButton::Close => label.dim(),
            ToolbarButton::Style(MarkdownStyle::Bold) => label.bold(),
            ToolbarButton::Style(MarkdownStyle::Italic) => label.italic(),
            ToolbarButton::Style(MarkdownStyle::Strike) => label.crossed_out(),
            ToolbarButton::Style(_) => label.cyan(),
        }
    }
}

/// What pressing a toolbar button asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Hide,
    Composer(ComposerEvent),
}

#[derive(Debug, Default)]
pub struct MarkdownToolbar {
    visible: bool,
}

impl MarkdownToolbar {
    pub fn new(visible: bool) -> Self {
        Self { visible }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn press(&mut self, button: ToolbarButton) -> ToolbarAction {
        match button {
            ToolbarButton::Close => {
                self.visible = false;
                ToolbarAction::Hide
            }
            ToolbarButton::Style(style) => {
                ToolbarAction::Composer(ComposerEvent::AddMarkdown(style))
            }
        }
    }
}

impl Renderable for MarkdownToolbar {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        if !self.visible || area.height == 0 {
            return;
        }
        let mut spans: Vec<Span<'static>> = Vec::new();
        for button in ToolbarButton::all() {
            if !spans.is_empty() {
                spans.push("  ".into());
            }
            spans.push("[".dim());
            spans.push(button.styled_label());
            spans.push("]".dim());
        }
        spans.push("  alt+key".dim());
        Line::from(spans).render(area, buf);
    }

    fn desired_height(&self, _width: u16) -> u16 {
        u16::from(self.visible)
    }
}
