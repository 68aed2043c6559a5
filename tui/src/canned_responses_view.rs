//! Full list of a room's canned responses, opened from the "no canned
//! responses" autocomplete row.

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Widget;
use relay_core::config::CannedResponse;

use crate::render::Renderable;
use crate::render::centered_rect;
use crate::scroll_state::ScrollState;

const VIEW_WIDTH: u16 = 60;
const MAX_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CannedAction {
    None,
    /// Put this response text into the composer.
    Use(String),
    Close,
}

#[derive(Debug)]
pub struct CannedResponsesView {
    room_id: String,
    modal: bool,
    responses: Vec<CannedResponse>,
    state: ScrollState,
}

impl CannedResponsesView {
    pub fn new(room_id: String, modal: bool, responses: Vec<CannedResponse>) -> Self {
        let mut state = ScrollState::new();
        state.clamp_selection(responses.len());
        Self {
            room_id,
            modal,
            responses,
            state,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn is_modal(&self) -> bool {
        self.modal
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> CannedAction {
        if key_event.kind == KeyEventKind::Release {
            return CannedAction::None;
        }
        let len = self.responses.len();
        match key_event.code {
            KeyCode::Esc => CannedAction::Close,
            KeyCode::Up => {
                self.state.move_up_wrap(len);
                self.state.ensure_visible(len, MAX_ROWS);
                CannedAction::None
            }
            KeyCode::Down => {
                self.state.move_down_wrap(len);
                self.state.ensure_visible(len, MAX_ROWS);
                CannedAction::None
            }
            KeyCode::Enter => self
                .state
                .selected_idx
                .and_then(|idx| self.responses.get(idx))
                .map_or(CannedAction::None, |response| {
                    CannedAction::Use(response.text.clone())
                }),
            _ => CannedAction::None,
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        if self.responses.is_empty() {
            return vec![Line::from("No canned responses".dim().italic())];
        }
        self.responses
            .iter()
            .enumerate()
            .skip(self.state.scroll_top)
            .take(MAX_ROWS)
            .map(|(idx, response)| {
                let selected = self.state.selected_idx == Some(idx);
                let shortcut = format!("!{}", response.shortcut);
                Line::from(vec![
                    if selected { "› ".into() } else { "  ".into() },
                    if selected {
                        shortcut.cyan().bold()
                    } else {
                        shortcut.into()
                    },
                    "  ".into(),
                    response.text.clone().dim(),
                ])
            })
            .collect()
    }
}

impl Renderable for CannedResponsesView {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let area = if self.modal {
            centered_rect(area, VIEW_WIDTH, self.desired_height(area.width))
        } else {
            area
        };
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::new().cyan())
            .title(" Canned responses ".bold());
        let inner = block.inner(area);
        block.render(area, buf);
        for (row, line) in self.lines().into_iter().enumerate() {
            let Ok(row) = u16::try_from(row) else { break };
            if row >= inner.height {
                break;
            }
            line.render(Rect::new(inner.x, inner.y + row, inner.width, 1), buf);
        }
    }

    fn desired_height(&self, _width: u16) -> u16 {
        let rows = self.responses.len().clamp(1, MAX_ROWS);
        u16::try_from(rows).unwrap_or(u16::MAX) + 2
    }
}
