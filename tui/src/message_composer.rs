//! The pane at the bottom of a room: autocomplete popup, markdown toolbar,
//! the composer input and its buttons.
//!
//! The pane owns the active [`AutocompleteParams`]. The composer reports
//! which trigger is active; the pane fetches candidates for it and routes
//! navigation keys to the popup while it is open.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use relay_core::autocomplete::AutocompleteItem;
use relay_core::config::ComposerSettings;
use relay_core::suggestions::SuggestionSource;
use relay_core::trigger::AutocompleteParams;
use tokio::time::Instant;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::autocomplete_popup::AutocompletePopup;
use crate::buttons::BUTTON_WIDTH;
use crate::buttons::MicOrSendButton;
use crate::buttons::RecordingIndicator;
use crate::buttons::ReviewButton;
use crate::composer_input::ComposerContext;
use crate::composer_input::ComposerEvent;
use crate::composer_input::ComposerInput;
use crate::composer_input::InputResult;
use crate::composer_input::MicOrSend;
use crate::markdown_toolbar::MarkdownToolbar;
use crate::markdown_toolbar::ToolbarAction;
use crate::markdown_toolbar::ToolbarButton;
use crate::render::Renderable;
use crate::services::Services;

pub struct MessageComposer {
    composer: ComposerInput,
    popup: AutocompletePopup,
    autocomplete: AutocompleteParams,
    suggestions: Arc<dyn SuggestionSource>,
    toolbar: MarkdownToolbar,
    mic_or_send: MicOrSend,
    recording_started: Option<Instant>,
    app_event_tx: AppEventSender,
}

impl MessageComposer {
    pub fn new(
        context: ComposerContext,
        services: Services,
        settings: &ComposerSettings,
        app_event_tx: AppEventSender,
    ) -> Self {
        let suggestions = services.suggestions.clone();
        let composer =
            ComposerInput::new(context, services, app_event_tx.clone(), settings.debounce());
        Self {
            composer,
            popup: AutocompletePopup::new(),
            autocomplete: AutocompleteParams::cleared(),
            suggestions,
            toolbar: MarkdownToolbar::new(settings.show_markdown_toolbar),
            mic_or_send: MicOrSend::Mic,
            recording_started: None,
            app_event_tx,
        }
    }

    pub async fn mount(&mut self) {
        self.composer.mount().await;
        self.mic_or_send = self.composer.mic_or_send();
    }

    pub async fn unmount(self) {
        self.composer.unmount().await;
    }

    pub fn composer(&self) -> &ComposerInput {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut ComposerInput {
        &mut self.composer
    }

    pub fn autocomplete(&self) -> &AutocompleteParams {
        &self.autocomplete
    }

    pub fn popup_items(&self) -> &[AutocompleteItem] {
        self.popup.items()
    }

    pub fn is_popup_visible(&self) -> bool {
        self.autocomplete.is_active() && !self.popup.is_empty()
    }

    pub fn mic_or_send(&self) -> MicOrSend {
        self.mic_or_send
    }

    pub fn set_mic_or_send(&mut self, mode: MicOrSend) {
        self.mic_or_send = mode;
    }

    pub fn is_recording(&self) -> bool {
        self.recording_started.is_some()
    }

    pub fn toolbar(&self) -> &MarkdownToolbar {
        &self.toolbar
    }

    pub fn toggle_markdown_toolbar(&mut self) {
        self.toolbar.toggle();
    }

    /// Open the popup for `params` and load its candidates.
    pub async fn set_autocomplete(&mut self, params: AutocompleteParams) {
        if !params.is_active() {
            self.close_autocomplete();
            return;
        }
        self.popup.set_items(vec![AutocompleteItem::Loading]);
        let items = self.suggestions.suggestions(&params).await;
        self.autocomplete = params;
        self.popup.set_items(items);
    }

    pub fn close_autocomplete(&mut self) {
        self.autocomplete = AutocompleteParams::cleared();
        self.popup.clear();
    }

    /// Debounced classification came back for `text`.
    pub async fn classify_draft(&mut self, text: &str) {
        let params = self.composer.run_autocomplete(text).await;
        self.set_autocomplete(params).await;
    }

    pub async fn handle_composer_event(&mut self, event: ComposerEvent) {
        // A live trigger counts even when it matched nothing.
        let active = self.autocomplete.is_active();
        if let Some(params) = self.composer.handle_composer_event(event, active) {
            self.set_autocomplete(params).await;
        }
    }

    pub async fn press_toolbar_button(&mut self, button: ToolbarButton) {
        match self.toolbar.press(button) {
            ToolbarAction::Hide => {}
            ToolbarAction::Composer(event) => self.handle_composer_event(event).await,
        }
    }

    pub fn set_focused(&mut self, focused: bool) {
        if focused {
            self.composer.focus();
        } else {
            self.composer.blur();
        }
    }

    pub fn handle_paste(&mut self, pasted: &str) {
        if !self.is_recording() {
            self.composer.handle_paste(pasted);
        }
    }

    pub async fn handle_key_event(&mut self, key_event: KeyEvent) -> InputResult {
        if key_event.kind == KeyEventKind::Release {
            return InputResult::None;
        }
        if let Some(started) = self.recording_started {
            self.handle_recording_key(key_event, started);
            return InputResult::None;
        }

        match key_event {
            KeyEvent {
                code: KeyCode::Char('t'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                self.toggle_markdown_toolbar();
                return InputResult::None;
            }
            KeyEvent {
                code: KeyCode::Char('m'),
                modifiers: KeyModifiers::ALT,
                ..
            } => {
                self.handle_composer_event(ComposerEvent::ToolbarMention).await;
                return InputResult::None;
            }
            KeyEvent {
                code: KeyCode::Char('r'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } if self.composer.get_text().is_empty() => {
                self.close_autocomplete();
                self.recording_started = Some(Instant::now());
                return InputResult::None;
            }
            _ => {}
        }
        if let Some(button) = ToolbarButton::for_key(key_event) {
            self.press_toolbar_button(button).await;
            return InputResult::None;
        }

        if self.is_popup_visible() {
            match key_event.code {
                KeyCode::Up => {
                    self.popup.move_up();
                    return InputResult::None;
                }
                KeyCode::Down => {
                    self.popup.move_down();
                    return InputResult::None;
                }
                KeyCode::Enter | KeyCode::Tab if key_event.modifiers.is_empty() => {
                    if let Some(item) = self.popup.selected_item().cloned() {
                        self.composer.on_autocomplete_item_selected(&item).await;
                    }
                    return InputResult::None;
                }
                KeyCode::Esc => {
                    self.close_autocomplete();
                    return InputResult::None;
                }
                _ => {}
            }
        }

        let result = self.composer.handle_key_event(key_event);
        if !self.composer.is_focused() {
            self.close_autocomplete();
        }
        result
    }

    fn handle_recording_key(&mut self, key_event: KeyEvent, started: Instant) {
        match key_event.code {
            KeyCode::Enter => {
                self.recording_started = None;
                self.app_event_tx
                    .send(AppEvent::AudioMessageRecorded(started.elapsed()));
            }
            KeyCode::Esc => {
                self.recording_started = None;
            }
            _ => {}
        }
    }

    fn recording_elapsed(&self) -> Option<Duration> {
        self.recording_started.as_ref().map(Instant::elapsed)
    }

    fn layout(&self, area: Rect) -> [Rect; 3] {
        let popup_height = if self.is_popup_visible() {
            self.popup.desired_height(area.width)
        } else {
            0
        };
        Layout::vertical([
            Constraint::Length(popup_height),
            Constraint::Length(self.toolbar.desired_height(area.width)),
            Constraint::Min(1),
        ])
        .areas(area)
    }

    fn input_areas(input_row: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Min(1), Constraint::Length(BUTTON_WIDTH)]).areas(input_row)
    }
}

impl Renderable for MessageComposer {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let [popup_area, toolbar_area, input_row] = self.layout(area);
        if self.is_popup_visible() {
            self.popup.render(popup_area, buf);
        }
        self.toolbar.render(toolbar_area, buf);

        let [input_area, button_area] = Self::input_areas(input_row);
        // Buttons sit on the first line inside the input border.
        let button_area = Rect {
            y: button_area.y + u16::from(button_area.height > 1),
            height: 1.min(button_area.height),
            x: button_area.x + 1,
            width: button_area.width.saturating_sub(1),
        };
        match self.recording_elapsed() {
            Some(elapsed) => {
                let line_area = Rect {
                    y: input_area.y + u16::from(input_area.height > 1),
                    height: 1.min(input_area.height),
                    ..input_area
                };
                RecordingIndicator { elapsed }.render(line_area, buf);
                ReviewButton.render(button_area, buf);
            }
            None => {
                self.composer.render(input_area, buf);
                MicOrSendButton {
                    mode: self.mic_or_send,
                }
                .render(button_area, buf);
            }
        }
    }

    fn desired_height(&self, width: u16) -> u16 {
        let popup = if self.is_popup_visible() {
            self.popup.desired_height(width)
        } else {
            0
        };
        let input_width = width.saturating_sub(BUTTON_WIDTH);
        popup + self.toolbar.desired_height(width) + self.composer.desired_height(input_width)
    }

    fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        if self.is_recording() {
            return None;
        }
        let [_, _, input_row] = self.layout(area);
        let [input_area, _] = Self::input_areas(input_row);
        self.composer.cursor_pos(input_area)
    }
}
