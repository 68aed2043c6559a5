use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Widget;

use crate::composer_input::MicOrSend;

/// Width reserved next to the input for the action button.
pub const BUTTON_WIDTH: u16 = 8;

/// Mic button while the draft is empty, send button otherwise.
#[derive(Debug, Clone, Copy)]
pub struct MicOrSendButton {
    pub mode: MicOrSend,
}

impl Widget for MicOrSendButton {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = match self.mode {
            MicOrSend::Mic => Line::from(vec!["[".dim(), "mic".into(), "]".dim()]),
            MicOrSend::Send => Line::from(vec!["[".dim(), "send".cyan().bold(), "]".dim()]),
        };
        line.render(area, buf);
    }
}

/// Confirms a recorded audio message.
#[derive(Debug, Clone, Copy)]
pub struct ReviewButton;

impl Widget for ReviewButton {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Line::from(vec!["[".dim(), "→".cyan().bold(), "]".dim()]).render(area, buf);
    }
}

/// Elapsed-time readout shown in place of the input while recording.
#[derive(Debug, Clone, Copy)]
pub struct RecordingIndicator {
    pub elapsed: Duration,
}

impl Widget for RecordingIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let secs = self.elapsed.as_secs();
        Line::from(vec![
            "● ".red(),
            format!("Recording {}:{:02}", secs / 60, secs % 60).into(),
            "  enter to send, esc to discard".dim(),
        ])
        .render(area, buf);
    }
}
