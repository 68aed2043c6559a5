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
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use relay_core::room::RoomType;

use crate::render::Renderable;
use crate::render::centered_rect;

/// Read-only details for a room the user is not subscribed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfoView {
    room_type: RoomType,
    room_id: String,
    name: Option<String>,
}

impl RoomInfoView {
    pub fn new(room_type: RoomType, room_id: String, name: Option<String>) -> Self {
        Self {
            room_type,
            room_id,
            name,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Returns true when the view should close.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> bool {
        key_event.kind != KeyEventKind::Release
            && matches!(key_event.code, KeyCode::Esc | KeyCode::Enter)
    }

    fn type_label(&self) -> &'static str {
        match self.room_type {
            RoomType::Direct => "direct message",
            RoomType::Channel => "channel",
            RoomType::Private => "private group",
            RoomType::Livechat => "omnichannel",
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        if let Some(name) = &self.name {
            lines.push(Line::from(format!("#{name}").bold()));
        }
        lines.push(Line::from(vec!["Type  ".dim(), self.type_label().into()]));
        lines.push(Line::from(vec!["Id    ".dim(), self.room_id.clone().into()]));
        lines.push(Line::default());
        lines.push(Line::from("You are not a member of this room.".italic()));
        lines.push(Line::from("esc to close".dim()));
        lines
    }
}

impl Renderable for RoomInfoView {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let area = centered_rect(area, 50, self.desired_height(area.width));
        Clear.render(area, buf);
        Paragraph::new(self.lines())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::new().cyan())
                    .title(" Room info ".bold()),
            )
            .render(area, buf);
    }

    fn desired_height(&self, _width: u16) -> u16 {
        u16::try_from(self.lines().len())
            .unwrap_or(u16::MAX)
            .saturating_add(2)
    }
}
