//! The "Report user" screen: who is being reported, a required description
//! and a submit button.

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use ratatui::widgets::Wrap;
use relay_core::report::ReportUserParams;
use relay_core::report::validate_description;
use unicode_width::UnicodeWidthStr;

use crate::render::Renderable;
use crate::render::centered_rect;

const VIEW_WIDTH: u16 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportAction {
    None,
    /// Send the report with this (trimmed) description.
    Submit(String),
    Close,
}

#[derive(Debug)]
pub struct ReportUserView {
    params: ReportUserParams,
    description: String,
    error: Option<String>,
}

impl ReportUserView {
    pub fn new(params: ReportUserParams) -> Self {
        Self {
            params,
            description: String::new(),
            error: None,
        }
    }

    pub fn params(&self) -> &ReportUserParams {
        &self.params
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Show a submission failure under the description.
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    pub fn handle_paste(&mut self, pasted: &str) {
        self.description.push_str(pasted);
        self.error = None;
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> ReportAction {
        if key_event.kind == KeyEventKind::Release {
            return ReportAction::None;
        }
        match key_event.code {
            KeyCode::Esc => return ReportAction::Close,
            KeyCode::Enter
                if key_event
                    .modifiers
                    .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
            {
                self.description.push('\n');
            }
            KeyCode::Enter => return self.submit(),
            KeyCode::Backspace => {
                self.description.pop();
            }
            KeyCode::Char(c)
                if !key_event
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.description.push(c);
            }
            _ => return ReportAction::None,
        }
        self.error = None;
        ReportAction::None
    }

    fn submit(&mut self) -> ReportAction {
        match validate_description(&self.description) {
            Ok(description) => ReportAction::Submit(description.to_string()),
            Err(err) => {
                self.error = Some(err.to_string());
                ReportAction::None
            }
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(vec![
                format!(" {} ", self.params.initial()).reversed().bold(),
                "  ".into(),
                self.params.display_name().to_string().bold(),
            ]),
            Line::from(format!("@{}", self.params.username).dim()),
            Line::default(),
            Line::from(vec!["Why are you reporting this user?".into(), " *".red()]),
        ];
        if self.description.is_empty() {
            lines.push(Line::from("Describe the problem".dim().italic()));
        } else {
            lines.extend(
                self.description
                    .split('\n')
                    .map(|line| Line::from(line.to_string())),
            );
        }
        if let Some(error) = &self.error {
            lines.push(Line::from(error.clone().red()));
        }
        lines.push(Line::default());
        lines.push(Line::from(vec![
            "[ Report ]".cyan().bold(),
            "  enter to submit, esc to cancel".dim(),
        ]));
        lines
    }

    fn area(&self, area: Rect) -> Rect {
        let height = u16::try_from(self.lines().len())
            .unwrap_or(u16::MAX)
            .saturating_add(2);
        centered_rect(area, VIEW_WIDTH, height)
    }

    fn block() -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::new().cyan())
            .title(" Report user ".bold())
    }
}

impl Renderable for ReportUserView {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let area = self.area(area);
        Clear.render(area, buf);
        Paragraph::new(self.lines())
            .block(Self::block())
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }

    fn desired_height(&self, _width: u16) -> u16 {
        u16::try_from(self.lines().len())
            .unwrap_or(u16::MAX)
            .saturating_add(2)
    }

    fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        let inner = Self::block().inner(self.area(area));
        // Header takes four rows; the description starts on the fifth.
        let rows = self.description.split('\n').count();
        let last = self.description.rsplit('\n').next().unwrap_or_default();
        let row = u16::try_from(3 + rows).ok()?;
        let col = u16::try_from(last.width()).unwrap_or(u16::MAX);
        if row >= inner.height || inner.width == 0 {
            return None;
        }
        Some((inner.x + col.min(inner.width - 1), inner.y + row))
    }
}
