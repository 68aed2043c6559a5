//! The message composer text field.
//!
//! [`ComposerInput`] owns the draft text and the selection and is the only
//! place either is mutated; every change funnels through
//! [`ComposerInput::set_input`]. Keystrokes schedule a debounced
//! [`AppEvent::ClassifyDraft`]; when it comes back through the app loop the
//! owning pane calls [`ComposerInput::run_autocomplete`] to decide which popup
//! should be open.
//!
//! Drafts are restored on [`ComposerInput::mount`] and persisted on
//! [`ComposerInput::unmount`], except while editing an existing message.
//! Dropping the input drops its debouncer, so no classification can fire for
//! a composer that is gone. A classification already queued on the app bus
//! carries the [`ComposerId`] of its sender and is discarded by any other
//! composer.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use relay_async_utils::Debouncer;
use relay_core::Selection;
use relay_core::autocomplete::AutocompleteItem;
use relay_core::autocomplete::splice_suggestion;
use relay_core::commands::CommandPreviewItem;
use relay_core::commands::generate_trigger_id;
use relay_core::draft::DraftKey;
use relay_core::markdown::MarkdownStyle;
use relay_core::markdown::Splice;
use relay_core::markdown::insert_mention_marker;
use relay_core::markdown::wrap_selection;
use relay_core::room::RoomSubscription;
use relay_core::room::RoomType;
use relay_core::room::composer_placeholder;
use relay_core::services::CommandPreviewRequest;
use relay_core::trigger::AutocompleteParams;
use relay_core::trigger::TriggerKind;
use relay_core::trigger::classify;
use tracing::debug;
use tracing::error;
use tracing::warn;
use unicode_width::UnicodeWidthStr;

use crate::app_event::AppEvent;
use crate::app_event::Route;
use crate::app_event_sender::AppEventSender;
use crate::render::Renderable;
use crate::services::Services;

static NEXT_COMPOSER_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one [`ComposerInput`] for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComposerId(u64);

impl ComposerId {
    fn next() -> Self {
        Self(NEXT_COMPOSER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ComposerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "composer-{}", self.0)
    }
}

/// Tallest the input grows before it stops expanding, borders included.
const MAX_INPUT_HEIGHT: u16 = 8;

/// What the button next to the input does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MicOrSend {
    #[default]
    Mic,
    Send,
}

/// Requests delivered to the composer by the pane that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerEvent {
    AddMarkdown(MarkdownStyle),
    ToolbarMention,
}

/// Commands other widgets issue against the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerCommand {
    GetTextAndClear,
    GetText,
    GetSelection,
    SetInput {
        text: String,
        selection: Option<Selection>,
    },
    ApplySuggestion(AutocompleteItem),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    Text(String),
    Selection(Selection),
    Done,
}

/// Result returned when the user interacts with the text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    Submitted(String),
    None,
}

/// The room and mode a composer is opened for.
#[derive(Debug, Clone, Default)]
pub struct ComposerContext {
    pub room_id: String,
    pub thread_id: Option<String>,
    pub subscription: Option<RoomSubscription>,
    /// Id of the message being edited. Drafts are neither loaded nor saved
    /// while this is set.
    pub editing: Option<String>,
    /// Sharing a file: typing notifications are suppressed.
    pub sharing: bool,
    pub master_detail: bool,
}

impl ComposerContext {
    pub fn draft_key(&self) -> DraftKey {
        DraftKey::new(self.room_id.clone(), self.thread_id.clone())
    }

    pub fn room_type(&self) -> Option<RoomType> {
        self.subscription.as_ref().map(|room| room.room_type)
    }
}

pub struct ComposerInput {
    id: ComposerId,
    text: String,
    selection: Selection,
    focused: bool,
    mic_or_send: MicOrSend,
    context: ComposerContext,
    services: Services,
    app_event_tx: AppEventSender,
    classifier: Debouncer<String>,
}

impl ComposerInput {
    /// Must be called from within a Tokio runtime.
    pub fn new(
        context: ComposerContext,
        services: Services,
        app_event_tx: AppEventSender,
        debounce: Duration,
    ) -> Self {
        let id = ComposerId::next();
        let tx = app_event_tx.clone();
        let classifier = Debouncer::new(debounce, move |text| {
            tx.send(AppEvent::ClassifyDraft { composer: id, text });
        });
        Self {
            id,
            text: String::new(),
            selection: Selection::default(),
            focused: true,
            mic_or_send: MicOrSend::Mic,
            context,
            services,
            app_event_tx,
            classifier,
        }
    }

    /// Install the initial text: the message body in edit mode, otherwise the
    /// saved draft for this room and thread.
    pub async fn mount(&mut self) {
        match self.context.editing.clone() {
            Some(message_id) => match self.services.messages.get(&message_id).await {
                Ok(Some(message)) => {
                    let end = message.body.len();
                    self.set_input(message.body, Some(Selection::caret(end)));
                    self.focus();
                }
                Ok(None) => warn!(%message_id, "message to edit not found"),
                Err(err) => error!(%message_id, "failed to load message to edit: {err}"),
            },
            None => {
                let key = self.context.draft_key();
                match self.services.drafts.load(&key).await {
                    Ok(Some(draft)) => {
                        let end = draft.len();
                        self.set_input(draft, Some(Selection::caret(end)));
                    }
                    Ok(None) => {}
                    Err(err) => error!(%key, "failed to load draft: {err}"),
                }
            }
        }
    }

    /// Persist the draft (outside edit mode) and tear the composer down.
    pub async fn unmount(self) {
        if self.context.editing.is_some() {
            return;
        }
        let key = self.context.draft_key();
        if let Err(err) = self.services.drafts.save(&key, &self.text).await {
            error!(%key, "failed to save draft: {err}");
        }
    }

    pub fn id(&self) -> ComposerId {
        self.id
    }

    pub fn get_text(&self) -> &str {
        &self.text
    }

    pub fn get_selection(&self) -> Selection {
        self.selection
    }

    /// Return the current text and reset the field to empty.
    pub fn get_text_and_clear(&mut self) -> String {
        let text = std::mem::take(&mut self.text);
        self.set_input(String::new(), Some(Selection::default()));
        // Re-classify the empty draft so the popup closes and typing stops.
        self.classifier.call(String::new());
        text
    }

    /// Replace the text and, optionally, the selection. The selection is
    /// clamped to the new text either way.
    pub fn set_input(&mut self, text: impl Into<String>, selection: Option<Selection>) {
        self.text = text.into();
        self.selection = selection.unwrap_or(self.selection).clamp_to(&self.text);
        let mode = if self.text.is_empty() {
            MicOrSend::Mic
        } else {
            MicOrSend::Send
        };
        if mode != self.mic_or_send {
            self.mic_or_send = mode;
            self.app_event_tx.send(AppEvent::ComposerModeChanged(mode));
        }
    }

    pub async fn handle_command(&mut self, command: ComposerCommand) -> CommandReply {
        match command {
            ComposerCommand::GetTextAndClear => CommandReply::Text(self.get_text_and_clear()),
            ComposerCommand::GetText => CommandReply::Text(self.text.clone()),
            ComposerCommand::GetSelection => CommandReply::Selection(self.selection),
            ComposerCommand::SetInput { text, selection } => {
                self.set_input(text, selection);
                CommandReply::Done
            }
            ComposerCommand::ApplySuggestion(item) => {
                self.on_autocomplete_item_selected(&item).await;
                CommandReply::Done
            }
        }
    }

    /// The user changed the text; store it and schedule classification.
    pub fn on_change_text(&mut self, text: String, selection: Option<Selection>) {
        self.set_input(text, selection);
        self.classifier.call(self.text.clone());
    }

    pub fn on_selection_change(&mut self, selection: Selection) {
        self.selection = selection.clamp_to(&self.text);
    }

    pub fn mic_or_send(&self) -> MicOrSend {
        self.mic_or_send
    }

    pub fn context(&self) -> &ComposerContext {
        &self.context
    }

    pub fn is_editing(&self) -> bool {
        self.context.editing.is_some()
    }

    /// Leave edit mode; from now on the text is treated as a draft again.
    pub fn finish_editing(&mut self) {
        self.context.editing = None;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn placeholder(&self) -> String {
        composer_placeholder(
            self.context.subscription.as_ref(),
            self.context.thread_id.as_deref(),
        )
    }

    /// Decide which autocomplete popup `text` opens, reporting typing along
    /// the way.
    pub async fn run_autocomplete(&self, text: &str) -> AutocompleteParams {
        if text.is_empty() {
            self.notify_typing(false).await;
            return AutocompleteParams::cleared();
        }
        if !self.context.sharing {
            self.notify_typing(true).await;
        }
        if !self.focused {
            return AutocompleteParams::cleared();
        }
        let cursor = self.selection.clamp_to(text).cursor();
        classify(
            text,
            cursor,
            self.context.room_type(),
            self.services.commands.as_ref(),
        )
        .await
    }

    async fn notify_typing(&self, is_typing: bool) {
        if let Err(err) = self
            .services
            .room_services
            .notify_typing(&self.context.room_id, is_typing)
            .await
        {
            debug!("failed to send typing indicator: {err}");
        }
    }

    /// Apply a request from the owning pane. Returns the autocomplete query
    /// the pane should open, if any.
    pub fn handle_composer_event(
        &mut self,
        event: ComposerEvent,
        autocomplete_active: bool,
    ) -> Option<AutocompleteParams> {
        match event {
            ComposerEvent::AddMarkdown(style) => {
                let splice = wrap_selection(&self.text, self.selection, style);
                self.apply_splice(splice);
                self.focus();
                None
            }
            ComposerEvent::ToolbarMention => {
                if autocomplete_active {
                    return None;
                }
                let splice = insert_mention_marker(&self.text, self.selection);
                self.apply_splice(splice);
                self.focus();
                Some(AutocompleteParams::new(TriggerKind::Mention, ""))
            }
        }
    }

    /// Write the chosen suggestion into the draft.
    pub async fn on_autocomplete_item_selected(&mut self, item: &AutocompleteItem) {
        match item {
            AutocompleteItem::Loading => return,
            AutocompleteItem::CommandPreview {
                command,
                params,
                preview,
            } => {
                self.execute_command_preview(command, params, preview).await;
                self.apply_splice(Splice {
                    text: String::new(),
                    selection: Selection::default(),
                });
                self.app_event_tx.send(AppEvent::CloseAutocomplete);
                return;
            }
            AutocompleteItem::NoCannedResponses => {
                self.app_event_tx
                    .send(AppEvent::Navigate(Route::CannedResponses {
                        room_id: self.context.room_id.clone(),
                        modal: self.context.master_detail,
                    }));
                self.app_event_tx.send(AppEvent::CloseAutocomplete);
                return;
            }
            _ => {}
        }

        if let Some(replacement) = item.replacement() {
            let splice = splice_suggestion(&self.text, self.selection, item.kind(), &replacement);
            self.apply_splice(splice);
        }
        self.focus();
        self.app_event_tx.send(AppEvent::CloseAutocomplete);
    }

    async fn execute_command_preview(
        &self,
        command: &str,
        params: &str,
        preview: &CommandPreviewItem,
    ) {
        let app_id = match self.services.commands.get(command).await {
            Ok(record) => record.and_then(|record| record.app_id),
            Err(err) => {
                warn!(command, "failed to look up command: {err}");
                None
            }
        };
        let request = CommandPreviewRequest {
            command: command.to_string(),
            params: params.to_string(),
            room_id: self.context.room_id.clone(),
            preview: preview.clone(),
            trigger_id: generate_trigger_id(app_id.as_deref()),
            thread_id: self.context.thread_id.clone(),
        };
        let room_services = self.services.room_services.clone();
        tokio::spawn(async move {
            if let Err(err) = room_services.execute_command_preview(request).await {
                error!("failed to execute command preview: {err}");
            }
        });
    }

    /// Programmatic rewrite. A classification still pending for the old text
    /// would be stale, so it is dropped.
    fn apply_splice(&mut self, splice: Splice) {
        self.classifier.cancel();
        self.set_input(splice.text, Some(splice.selection));
    }

    pub fn handle_paste(&mut self, pasted: &str) {
        let pasted = pasted.replace("\r\n", "\n").replace('\r', "\n");
        self.insert_str(&pasted);
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> InputResult {
        if key_event.kind == KeyEventKind::Release {
            return InputResult::None;
        }
        let shift = key_event.modifiers.contains(KeyModifiers::SHIFT);
        match key_event.code {
            KeyCode::Enter
                if key_event
                    .modifiers
                    .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
            {
                self.insert_str("\n");
            }
            KeyCode::Enter => {
                if !self.text.trim().is_empty() {
                    return InputResult::Submitted(self.get_text_and_clear());
                }
            }
            KeyCode::Esc => self.blur(),
            KeyCode::Char(c)
                if !key_event
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let mut buf = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut buf));
            }
            KeyCode::Tab => self.insert_str("\t"),
            KeyCode::Backspace => self.delete_backward(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Left => {
                let Selection { start, end } = self.selection;
                let selection = if shift {
                    Selection::new(prev_boundary(&self.text, start), end)
                } else if start != end {
                    Selection::caret(start)
                } else {
                    Selection::caret(prev_boundary(&self.text, start))
                };
                self.on_selection_change(selection);
            }
            KeyCode::Right => {
                let Selection { start, end } = self.selection;
                let selection = if shift {
                    Selection::new(start, next_boundary(&self.text, end))
                } else if start != end {
                    Selection::caret(end)
                } else {
                    Selection::caret(next_boundary(&self.text, end))
                };
                self.on_selection_change(selection);
            }
            KeyCode::Home => {
                let line_start = self.text[..self.selection.start]
                    .rfind('\n')
                    .map_or(0, |idx| idx + 1);
                self.on_selection_change(Selection::caret(line_start));
            }
            KeyCode::End => {
                let end = self.selection.end;
                let line_end = self.text[end..]
                    .find('\n')
                    .map_or(self.text.len(), |idx| end + idx);
                self.on_selection_change(Selection::caret(line_end));
            }
            _ => {}
        }
        InputResult::None
    }

    fn insert_str(&mut self, inserted: &str) {
        self.focus();
        let Selection { start, end } = self.selection;
        let mut text = String::with_capacity(self.text.len() + inserted.len());
        text.push_str(&self.text[..start]);
        text.push_str(inserted);
        text.push_str(&self.text[end..]);
        let cursor = start + inserted.len();
        self.on_change_text(text, Some(Selection::caret(cursor)));
    }

    fn delete_backward(&mut self) {
        let Selection { start, end } = self.selection;
        let from = if start == end {
            prev_boundary(&self.text, start)
        } else {
            start
        };
        self.delete_range(from, end);
    }

    fn delete_forward(&mut self) {
        let Selection { start, end } = self.selection;
        let to = if start == end {
            next_boundary(&self.text, end)
        } else {
            end
        };
        self.delete_range(start, to);
    }

    fn delete_range(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let mut text = self.text.clone();
        text.replace_range(from..to, "");
        self.on_change_text(text, Some(Selection::caret(from)));
    }

    fn block(&self) -> Block<'static> {
        let border_style = if self.focused {
            Style::new().cyan()
        } else {
            Style::new().dim()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style);
        if self.is_editing() {
            block.title(" Editing message ")
        } else if self.context.thread_id.is_some() {
            block.title(" Thread ")
        } else {
            block
        }
    }

    fn lines(&self) -> Vec<Line<'_>> {
        if self.text.is_empty() {
            return vec![Line::from(self.placeholder().dim())];
        }
        let Selection { start, end } = self.selection;
        let mut offset = 0;
        self.text
            .split('\n')
            .map(|line| {
                let line_start = offset;
                let line_end = offset + line.len();
                offset = line_end + 1;
                let from = start.clamp(line_start, line_end) - line_start;
                let to = end.clamp(line_start, line_end) - line_start;
                if from == to {
                    Line::from(line)
                } else {
                    Line::from(vec![
                        Span::raw(&line[..from]),
                        Span::styled(&line[from..to], Style::new().reversed()),
                        Span::raw(&line[to..]),
                    ])
                }
            })
            .collect()
    }
}

impl Renderable for ComposerInput {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines())
            .block(self.block())
            .render(area, buf);
    }

    fn desired_height(&self, _width: u16) -> u16 {
        let lines = self.text.split('\n').count().max(1);
        u16::try_from(lines)
            .unwrap_or(u16::MAX)
            .saturating_add(2)
            .min(MAX_INPUT_HEIGHT)
    }

    fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        if !self.focused {
            return None;
        }
        let inner = self.block().inner(area);
        if inner.width == 0 || inner.height == 0 {
            return None;
        }
        let before = &self.text[..self.selection.end];
        let row = before.matches('\n').count();
        let line = before.rsplit('\n').next().unwrap_or_default();
        let col = u16::try_from(line.width()).unwrap_or(u16::MAX);
        let row = u16::try_from(row).ok().filter(|row| *row < inner.height)?;
        Some((inner.x + col.min(inner.width - 1), inner.y + row))
    }
}

fn prev_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .chars()
        .next_back()
        .map_or(0, |c| pos - c.len_utf8())
}

fn next_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len(), |c| pos + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use relay_core::commands::SlashCommandRecord;
    use relay_core::config::Config;
    use relay_core::memory::LoggingRoomServices;
    use relay_core::memory::RoomServiceCall;
    use relay_core::services::Message;
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::sync::mpsc::unbounded_channel;
    use tokio::time;
    use tokio_util::time::FutureExt;

    const DEBOUNCE: Duration = Duration::from_millis(300);

    struct Harness {
        composer: ComposerInput,
        rx: UnboundedReceiver<AppEvent>,
        room_services: Arc<LoggingRoomServices>,
        services: Services,
    }

    fn config() -> Config {
        let mut config = Config::default();
        let mut giphy = SlashCommandRecord::new("giphy");
        giphy.provides_preview = true;
        giphy.app_id = Some("giphy-app".to_string());
        config.commands = vec![giphy, SlashCommandRecord::new("weather")];
        config.directory.messages = vec![Message {
            id: "m1".to_string(),
            body: "original body".to_string(),
        }];
        config
    }

    fn context() -> ComposerContext {
        ComposerContext {
            room_id: "rid".to_string(),
            subscription: Some(Config::default().room.subscription()),
            ..ComposerContext::default()
        }
    }

    fn harness(context: ComposerContext) -> Harness {
        let room_services = Arc::new(LoggingRoomServices::new());
        let services = Services::in_memory(&config(), room_services.clone());
        harness_with(context, services, room_services)
    }

    fn harness_with(
        context: ComposerContext,
        services: Services,
        room_services: Arc<LoggingRoomServices>,
    ) -> Harness {
        let (tx, rx) = unbounded_channel();
        let composer =
            ComposerInput::new(context, services.clone(), AppEventSender::new(tx), DEBOUNCE);
        Harness {
            composer,
            rx,
            room_services,
            services,
        }
    }

    fn type_str(composer: &mut ComposerInput, text: &str) {
        for c in text.chars() {
            composer.handle_key_event(KeyEvent::from(KeyCode::Char(c)));
        }
    }

    fn drain(rx: &mut UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    async fn next_classification(rx: &mut UnboundedReceiver<AppEvent>) -> Option<String> {
        loop {
            match rx.recv().timeout(Duration::from_secs(1)).await {
                Ok(Some(AppEvent::ClassifyDraft { text, .. })) => return Some(text),
                Ok(Some(_)) => continue,
                Ok(None) | Err(_) => return None,
            }
        }
    }

    #[tokio::test]
    async fn get_text_and_clear_returns_previous_text() {
        let mut h = harness(context());
        h.composer.set_input("hello", None);
        assert_eq!(h.composer.get_text_and_clear(), "hello");
        assert_eq!(h.composer.get_text(), "");
        assert_eq!(h.composer.get_selection(), Selection::caret(0));
        assert_eq!(
            drain(&mut h.rx),
            vec![
                AppEvent::ComposerModeChanged(MicOrSend::Send),
                AppEvent::ComposerModeChanged(MicOrSend::Mic),
            ]
        );
    }

    #[tokio::test]
    async fn set_input_clamps_the_selection() {
        let mut h = harness(context());
        h.composer.set_input("héllo", Some(Selection::new(2, 40)));
        assert_eq!(h.composer.get_selection(), Selection::new(1, 6));
        h.composer.set_input("hi", None);
        assert_eq!(h.composer.get_selection(), Selection::new(1, 2));
    }

    #[tokio::test]
    async fn commands_mirror_the_methods() {
        let mut h = harness(context());
        let reply = h
            .composer
            .handle_command(ComposerCommand::SetInput {
                text: "abc".to_string(),
                selection: Some(Selection::caret(1)),
            })
            .await;
        assert_eq!(reply, CommandReply::Done);
        assert_eq!(
            h.composer.handle_command(ComposerCommand::GetSelection).await,
            CommandReply::Selection(Selection::caret(1))
        );
        assert_eq!(
            h.composer
                .handle_command(ComposerCommand::GetTextAndClear)
                .await,
            CommandReply::Text("abc".to_string())
        );
        assert_eq!(
            h.composer.handle_command(ComposerCommand::GetText).await,
            CommandReply::Text(String::new())
        );
    }

    #[tokio::test]
    async fn markdown_event_wraps_the_selection() {
        let mut h = harness(context());
        h.composer.set_input("make this bold", Some(Selection::new(5, 9)));
        let params = h
            .composer
            .handle_composer_event(ComposerEvent::AddMarkdown(MarkdownStyle::Bold), false);
        assert_eq!(params, None);
        assert_eq!(h.composer.get_text(), "make *this* bold");
        assert_eq!(h.composer.get_selection(), Selection::new(6, 10));
    }

    #[tokio::test]
    async fn toolbar_mention_inserts_marker_unless_popup_is_open() {
        let mut h = harness(context());
        h.composer.set_input("hi ", Some(Selection::caret(3)));

        let ignored = h
            .composer
            .handle_composer_event(ComposerEvent::ToolbarMention, true);
        assert_eq!(ignored, None);
        assert_eq!(h.composer.get_text(), "hi ");

        let params = h
            .composer
            .handle_composer_event(ComposerEvent::ToolbarMention, false);
        assert_eq!(params, Some(AutocompleteParams::new(TriggerKind::Mention, "")));
        assert_eq!(h.composer.get_text(), "hi @");
        assert_eq!(h.composer.get_selection(), Selection::caret(4));
    }

    #[tokio::test]
    async fn selecting_a_mention_replaces_the_query() {
        let mut h = harness(context());
        h.composer.set_input("hello @jo", Some(Selection::caret(9)));
        h.composer.blur();
        h.composer
            .on_autocomplete_item_selected(&AutocompleteItem::User {
                username: "john".to_string(),
                name: None,
            })
            .await;
        assert_eq!(h.composer.get_text(), "hello @john ");
        assert_eq!(h.composer.get_selection(), Selection::caret(12));
        assert!(h.composer.is_focused());
        assert_eq!(
            drain(&mut h.rx).last(),
            Some(&AppEvent::CloseAutocomplete)
        );
    }

    #[tokio::test]
    async fn loading_item_is_ignored() {
        let mut h = harness(context());
        h.composer.set_input("@jo", None);
        drain(&mut h.rx);
        h.composer
            .on_autocomplete_item_selected(&AutocompleteItem::Loading)
            .await;
        assert_eq!(h.composer.get_text(), "@jo");
        assert!(drain(&mut h.rx).is_empty());
    }

    #[tokio::test]
    async fn no_canned_responses_opens_the_list() {
        let mut h = harness(ComposerContext {
            master_detail: true,
            ..context()
        });
        h.composer.set_input("!gr", None);
        drain(&mut h.rx);
        h.composer
            .on_autocomplete_item_selected(&AutocompleteItem::NoCannedResponses)
            .await;
        assert_eq!(h.composer.get_text(), "!gr");
        assert_eq!(
            drain(&mut h.rx),
            vec![
                AppEvent::Navigate(Route::CannedResponses {
                    room_id: "rid".to_string(),
                    modal: true,
                }),
                AppEvent::CloseAutocomplete,
            ]
        );
    }

    #[tokio::test]
    async fn command_preview_executes_and_clears() {
        let mut h = harness(ComposerContext {
            thread_id: Some("tmid".to_string()),
            ..context()
        });
        h.composer.set_input("/giphy cats", None);
        let preview = CommandPreviewItem {
            id: "cat".to_string(),
            value: "cat.gif".to_string(),
        };
        h.composer
            .on_autocomplete_item_selected(&AutocompleteItem::CommandPreview {
                command: "giphy".to_string(),
                params: "cats".to_string(),
                preview: preview.clone(),
            })
            .await;
        assert_eq!(h.composer.get_text(), "");

        // The execution is spawned; let it run.
        tokio::task::yield_now().await;
        let calls = h.room_services.calls();
        let [RoomServiceCall::CommandPreview(request)] = calls.as_slice() else {
            panic!("expected one command preview call, got {calls:?}");
        };
        assert_eq!(request.command, "giphy");
        assert_eq!(request.params, "cats");
        assert_eq!(request.preview, preview);
        assert_eq!(request.room_id, "rid");
        assert_eq!(request.thread_id.as_deref(), Some("tmid"));
        assert!(request.trigger_id.ends_with(":giphy-app"));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn burst_of_keystrokes_classifies_once() {
        let mut h = harness(context());
        for c in "hello".chars() {
            h.composer.handle_key_event(KeyEvent::from(KeyCode::Char(c)));
            time::advance(Duration::from_millis(50)).await;
        }

        assert_eq!(next_classification(&mut h.rx).await.as_deref(), Some("hello"));
        assert_eq!(next_classification(&mut h.rx).await, None);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn classification_carries_the_composer_id() {
        let mut h = harness(context());
        let other = harness(context());
        assert_ne!(h.composer.id(), other.composer.id());

        type_str(&mut h.composer, "hi");
        let composer = loop {
            match h.rx.recv().timeout(Duration::from_secs(1)).await {
                Ok(Some(AppEvent::ClassifyDraft { composer, text })) => {
                    assert_eq!(text, "hi");
                    break composer;
                }
                Ok(Some(_)) => continue,
                Ok(None) | Err(_) => panic!("no classification was sent"),
            }
        };
        assert_eq!(composer, h.composer.id());
    }

    #[tokio::test]
    async fn slash_command_without_preview_opens_the_command_list() {
        let mut h = harness(context());
        h.composer.set_input("/weather ", Some(Selection::caret(9)));
        let params = h.composer.run_autocomplete("/weather ").await;
        assert_eq!(params, AutocompleteParams::new(TriggerKind::SlashCommand, ""));

        h.composer.set_input("/giphy cats", Some(Selection::caret(11)));
        let params = h.composer.run_autocomplete("/giphy cats").await;
        assert_eq!(params, AutocompleteParams::preview("giphy", "cats"));
    }

    #[tokio::test]
    async fn classification_reports_typing() {
        let mut h = harness(context());
        h.composer.set_input("@jo", Some(Selection::caret(3)));
        let params = h.composer.run_autocomplete("@jo").await;
        assert_eq!(params, AutocompleteParams::new(TriggerKind::Mention, "jo"));
        let cleared = h.composer.run_autocomplete("").await;
        assert_eq!(cleared, AutocompleteParams::cleared());
        assert_eq!(
            h.room_services.calls(),
            vec![
                RoomServiceCall::Typing {
                    room_id: "rid".to_string(),
                    is_typing: true,
                },
                RoomServiceCall::Typing {
                    room_id: "rid".to_string(),
                    is_typing: false,
                },
            ]
        );
    }

    #[tokio::test]
    async fn sharing_suppresses_typing_and_blur_clears_trigger() {
        let mut h = harness(ComposerContext {
            sharing: true,
            ..context()
        });
        h.composer.set_input("@jo", None);
        h.composer.blur();
        let params = h.composer.run_autocomplete("@jo").await;
        assert_eq!(params, AutocompleteParams::cleared());
        assert!(h.room_services.calls().is_empty());
    }

    #[tokio::test]
    async fn drafts_round_trip_through_mount_and_unmount() {
        let Harness {
            mut composer,
            room_services,
            services,
            ..
        } = harness(context());
        composer.mount().await;
        assert_eq!(composer.get_text(), "");
        type_str(&mut composer, "half written");
        composer.unmount().await;

        let mut reopened = harness_with(context(), services, room_services);
        reopened.composer.mount().await;
        assert_eq!(reopened.composer.get_text(), "half written");
        assert_eq!(reopened.composer.get_selection(), Selection::caret(12));
    }

    #[tokio::test]
    async fn edit_mode_loads_the_message_and_skips_drafts() {
        let editing = ComposerContext {
            editing: Some("m1".to_string()),
            ..context()
        };
        let Harness {
            mut composer,
            room_services,
            services,
            ..
        } = harness(editing);
        services.drafts.save(&context().draft_key(), "draft").await.unwrap();

        composer.mount().await;
        assert_eq!(composer.get_text(), "original body");
        type_str(&mut composer, "!");
        composer.unmount().await;

        let mut reopened = harness_with(context(), services, room_services);
        reopened.composer.mount().await;
        assert_eq!(reopened.composer.get_text(), "draft");
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn unmount_cancels_pending_classification() {
        let Harness {
            mut composer,
            mut rx,
            ..
        } = harness(context());
        type_str(&mut composer, "@jo");
        composer.unmount().await;

        assert_eq!(next_classification(&mut rx).await, None);
    }

    #[tokio::test]
    async fn editing_keys_respect_char_boundaries() {
        let mut h = harness(context());
        type_str(&mut h.composer, "añb");
        h.composer.handle_key_event(KeyEvent::from(KeyCode::Left));
        h.composer.handle_key_event(KeyEvent::from(KeyCode::Backspace));
        assert_eq!(h.composer.get_text(), "ab");
        assert_eq!(h.composer.get_selection(), Selection::caret(1));

        h.composer
            .handle_key_event(KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT));
        h.composer.handle_key_event(KeyEvent::from(KeyCode::Char('X')));
        assert_eq!(h.composer.get_text(), "aX");

        h.composer
            .handle_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        type_str(&mut h.composer, "line two");
        assert_eq!(h.composer.get_text(), "aX\nline two");

        let submitted = h.composer.handle_key_event(KeyEvent::from(KeyCode::Enter));
        assert_eq!(submitted, InputResult::Submitted("aX\nline two".to_string()));
        assert_eq!(h.composer.get_text(), "");
    }

    #[tokio::test]
    async fn renders_placeholder_and_cursor() {
        let mut h = harness(context());
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        h.composer.render(area, &mut buf);
        let row: String = (1..29).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert_eq!(row.trim_end(), "Message #general");
        assert_eq!(h.composer.cursor_pos(area), Some((1, 1)));

        type_str(&mut h.composer, "hey");
        assert_eq!(h.composer.cursor_pos(area), Some((4, 1)));
        assert_eq!(h.composer.desired_height(30), 3);
    }
}
