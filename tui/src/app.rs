use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Widget;
use relay_core::Selection;
use relay_core::config::Config;
use relay_core::hashtag::UserChannel;
use relay_core::report::ReportUserParams;
use relay_core::report::submit_report;
use relay_core::room::RoomSubscription;
use relay_core::room::RoomType;
use tokio::select;
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::StreamExt;
use tracing::debug;
use tracing::error;
use tracing::info;

use crate::app_event::AppEvent;
use crate::app_event::Route;
use crate::app_event_sender::AppEventSender;
use crate::canned_responses_view::CannedAction;
use crate::canned_responses_view::CannedResponsesView;
use crate::composer_input::ComposerContext;
use crate::composer_input::InputResult;
use crate::hashtag::Hashtag;
use crate::hashtag::last_resolved_hashtag;
use crate::hashtag::message_line;
use crate::message_composer::MessageComposer;
use crate::render::Renderable;
use crate::report_user_view::ReportAction;
use crate::report_user_view::ReportUserView;
use crate::room_info_view::RoomInfoView;
use crate::services::Services;
use crate::tui;
use crate::tui::TuiEvent;

const REPORT_COMMAND: &str = "/report";

/// One row of the room transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    Message { text: String, edited: bool },
    System(String),
}

/// Screen shown over the room, if any.
#[derive(Debug)]
pub enum Screen {
    ReportUser(ReportUserView),
    CannedResponses(CannedResponsesView),
    RoomInfo(RoomInfoView),
}

pub struct AppInit {
    pub config: Config,
    pub services: Services,
    pub context: ComposerContext,
}

pub struct App {
    pane: MessageComposer,
    screen: Option<Screen>,
    transcript: Vec<TranscriptEntry>,
    config: Config,
    services: Services,
    channels: Vec<UserChannel>,
    room: RoomSubscription,
    thread_id: Option<String>,
    app_event_tx: AppEventSender,
}

impl App {
    pub async fn new(init: AppInit, app_event_tx: AppEventSender) -> Self {
        let AppInit {
            config,
            services,
            context,
        } = init;
        let room = context
            .subscription
            .clone()
            .unwrap_or_else(|| config.room.subscription());
        let thread_id = context.thread_id.clone();
        let channels = config
            .directory
            .rooms
            .iter()
            .filter(|room| room.room_type != RoomType::Direct)
            .map(|room| UserChannel {
                id: room.id.clone(),
                name: room.name.clone(),
            })
            .collect();

        let mut pane = MessageComposer::new(
            context,
            services.clone(),
            &config.composer,
            app_event_tx.clone(),
        );
        pane.mount().await;

        Self {
            pane,
            screen: None,
            transcript: Vec::new(),
            config,
            services,
            channels,
            room,
            thread_id,
            app_event_tx,
        }
    }

    pub async fn run(tui: &mut tui::Tui, init: AppInit) -> Result<()> {
        let (app_event_tx, mut app_event_rx) = unbounded_channel();
        let mut app = App::new(init, AppEventSender::new(app_event_tx)).await;
        let frame_requester = tui.frame_requester();

        let tui_events = tui.event_stream();
        tokio::pin!(tui_events);

        frame_requester.redraw();

        while select! {
            Some(event) = app_event_rx.recv() => {
                frame_requester.redraw();
                app.handle_event(event).await
            }
            Some(event) = tui_events.next() => {
                match event {
                    TuiEvent::Draw => {
                        app.draw(tui)?;
                        // Keep the recording timer ticking.
                        if app.pane.is_recording() {
                            frame_requester.redraw_after(Duration::from_secs(1));
                        }
                        true
                    }
                    event => {
                        frame_requester.redraw();
                        app.handle_tui_event(event).await
                    }
                }
            }
        } {}
        app.shutdown().await;
        Ok(())
    }

    fn draw(&self, tui: &mut tui::Tui) -> Result<()> {
        tui.draw(|frame| {
            let area = frame.area();
            self.render(area, frame.buffer_mut());
            if let Some((x, y)) = self.cursor_pos(area) {
                frame.set_cursor_position((x, y));
            }
        })?;
        Ok(())
    }

    /// Returns false once the app should exit.
    pub async fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::ClassifyDraft { composer, text } => {
                // Queued before a room switch; the new composer has its own draft.
                if composer == self.pane.composer().id() {
                    self.pane.classify_draft(&text).await;
                } else {
                    debug!(%composer, "dropping classification for a closed composer");
                }
            }
            AppEvent::ComposerModeChanged(mode) => self.pane.set_mic_or_send(mode),
            AppEvent::CloseAutocomplete => self.pane.close_autocomplete(),
            AppEvent::Navigate(route) => self.navigate(route).await,
            AppEvent::AudioMessageRecorded(elapsed) => {
                let secs = elapsed.as_secs();
                self.transcript.push(TranscriptEntry::System(format!(
                    "audio message ({}:{:02})",
                    secs / 60,
                    secs % 60
                )));
            }
            AppEvent::Exit => return false,
        }
        true
    }

    pub async fn handle_tui_event(&mut self, event: TuiEvent) -> bool {
        match event {
            TuiEvent::Key(key_event) => self.handle_key_event(key_event).await,
            TuiEvent::Paste(pasted) => {
                // Many terminals convert newlines to \r when pasting.
                let pasted = pasted.replace("\r\n", "\n").replace('\r', "\n");
                match &mut self.screen {
                    Some(Screen::ReportUser(view)) => view.handle_paste(&pasted),
                    Some(_) => {}
                    None => self.pane.handle_paste(&pasted),
                }
            }
            TuiEvent::FocusGained => self.pane.set_focused(true),
            TuiEvent::FocusLost => {
                self.pane.set_focused(false);
                self.pane.close_autocomplete();
            }
            TuiEvent::Draw => {}
        }
        true
    }

    pub async fn handle_key_event(&mut self, key_event: KeyEvent) {
        if key_event.kind == KeyEventKind::Release {
            return;
        }
        if let KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            ..
        } = key_event
        {
            self.app_event_tx.send(AppEvent::Exit);
            return;
        }

        if self.screen.is_some() {
            self.handle_screen_key_event(key_event).await;
            return;
        }

        if let KeyEvent {
            code: KeyCode::Char('o'),
            modifiers: KeyModifiers::CONTROL,
            ..
        } = key_event
        {
            self.press_last_hashtag().await;
            return;
        }

        if let InputResult::Submitted(text) = self.pane.handle_key_event(key_event).await {
            self.on_submit(text);
        }
    }

    async fn handle_screen_key_event(&mut self, key_event: KeyEvent) {
        let Some(screen) = self.screen.as_mut() else {
            return;
        };
        match screen {
            Screen::ReportUser(view) => match view.handle_key_event(key_event) {
                ReportAction::None => {}
                ReportAction::Close => self.screen = None,
                ReportAction::Submit(description) => {
                    let params = view.params().clone();
                    match submit_report(
                        self.services.room_services.as_ref(),
                        &params,
                        &description,
                    )
                    .await
                    {
                        Ok(()) => {
                            self.screen = None;
                            self.transcript.push(TranscriptEntry::System(format!(
                                "reported @{}",
                                params.username
                            )));
                        }
                        Err(err) => {
                            error!(user_id = %params.user_id, "failed to report user: {err}");
                            view.set_error(err.to_string());
                        }
                    }
                }
            },
            Screen::CannedResponses(view) => match view.handle_key_event(key_event) {
                CannedAction::None => {}
                CannedAction::Close => self.screen = None,
                CannedAction::Use(text) => {
                    self.screen = None;
                    let end = text.len();
                    let composer = self.pane.composer_mut();
                    composer.set_input(text, Some(Selection::caret(end)));
                    composer.focus();
                }
            },
            Screen::RoomInfo(view) => {
                if view.handle_key_event(key_event) {
                    self.screen = None;
                }
            }
        }
    }

    fn on_submit(&mut self, text: String) {
        if let Some(rest) = text.strip_prefix(REPORT_COMMAND)
            && (rest.is_empty() || rest.starts_with(char::is_whitespace))
        {
            self.open_report(rest.trim().trim_start_matches('@'));
            return;
        }

        let edited = self.pane.composer().is_editing();
        if edited {
            self.pane.composer_mut().finish_editing();
        }
        info!(room_id = %self.room.id, edited, "message sent");
        self.transcript
            .push(TranscriptEntry::Message { text, edited });
    }

    fn open_report(&mut self, username: &str) {
        let Some(user) = self
            .config
            .directory
            .users
            .iter()
            .find(|user| user.username == username)
        else {
            self.transcript
                .push(TranscriptEntry::System(format!("unknown user @{username}")));
            return;
        };
        let params = ReportUserParams {
            username: user.username.clone(),
            room_id: self.room.id.clone(),
            user_id: user.id.clone().unwrap_or_else(|| user.username.clone()),
            name: user.name.clone(),
        };
        self.app_event_tx
            .send(AppEvent::Navigate(Route::ReportUser(params)));
    }

    /// Press the most recent hashtag in the transcript that names a channel.
    async fn press_last_hashtag(&mut self) {
        let hashtag = self.transcript.iter().rev().find_map(|entry| match entry {
            TranscriptEntry::Message { text, .. } => last_resolved_hashtag(text, &self.channels),
            TranscriptEntry::System(_) => None,
        });
        let Some(hashtag) = hashtag else {
            return;
        };
        let route = Hashtag::new(hashtag, &self.channels)
            .press(self.services.subscriptions.as_ref())
            .await;
        if let Some(route) = route {
            self.navigate(route).await;
        }
    }

    async fn navigate(&mut self, route: Route) {
        match route {
            Route::Room(room) => self.switch_room(room).await,
            Route::RoomInfo { room_type, room_id } => {
                let name = self
                    .channels
                    .iter()
                    .find(|channel| channel.id == room_id)
                    .map(|channel| channel.name.clone());
                self.screen = Some(Screen::RoomInfo(RoomInfoView::new(
                    room_type, room_id, name,
                )));
            }
            Route::CannedResponses { room_id, modal } => {
                self.screen = Some(Screen::CannedResponses(CannedResponsesView::new(
                    room_id,
                    modal,
                    self.config.directory.canned_responses.clone(),
                )));
            }
            Route::ReportUser(params) => {
                self.screen = Some(Screen::ReportUser(ReportUserView::new(params)));
            }
        }
    }

    async fn switch_room(&mut self, room: RoomSubscription) {
        if room.id == self.room.id {
            return;
        }
        let context = ComposerContext {
            room_id: room.id.clone(),
            thread_id: None,
            subscription: Some(room.clone()),
            editing: None,
            sharing: false,
            master_detail: self.config.composer.master_detail,
        };
        let pane = MessageComposer::new(
            context,
            self.services.clone(),
            &self.config.composer,
            self.app_event_tx.clone(),
        );
        let old = std::mem::replace(&mut self.pane, pane);
        old.unmount().await;
        self.pane.mount().await;
        info!(room_id = %room.id, "switched room");
        self.transcript.push(TranscriptEntry::System(format!(
            "switched to #{}",
            room.title()
        )));
        self.room = room;
        self.thread_id = None;
    }

    pub async fn shutdown(self) {
        self.pane.unmount().await;
    }

    pub fn pane(&self) -> &MessageComposer {
        &self.pane
    }

    pub fn pane_mut(&mut self) -> &mut MessageComposer {
        &mut self.pane
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn room(&self) -> &RoomSubscription {
        &self.room
    }

    fn header(&self) -> Line<'static> {
        let marker = if self.room.room_type == RoomType::Direct {
            "@"
        } else {
            "#"
        };
        let mut spans = vec![format!("{marker}{}", self.room.title()).bold()];
        if let Some(thread_id) = &self.thread_id {
            spans.push(format!("  thread {thread_id}").dim());
        }
        if self.pane.composer().is_editing() {
            spans.push("  editing".magenta());
        }
        Line::from(spans)
    }

    fn transcript_line(&self, entry: &TranscriptEntry) -> Line<'static> {
        match entry {
            TranscriptEntry::Message { text, edited } => {
                let mut line = message_line(text, &self.channels);
                if *edited {
                    line.push_span(" (edited)".dim());
                }
                line
            }
            TranscriptEntry::System(text) => Line::from(text.clone().dim().italic()),
        }
    }

    fn layout(&self, area: Rect) -> [Rect; 3] {
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(self.pane.desired_height(area.width)),
        ])
        .areas(area)
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let [header_area, transcript_area, pane_area] = self.layout(area);
        self.header().render(header_area, buf);

        // Newest entries sit just above the composer.
        let visible = usize::from(transcript_area.height);
        let skip = self.transcript.len().saturating_sub(visible);
        let offset = visible.saturating_sub(self.transcript.len() - skip);
        for (row, entry) in self.transcript.iter().skip(skip).enumerate() {
            let Ok(y) = u16::try_from(offset + row) else {
                break;
            };
            let line_area = Rect::new(
                transcript_area.x,
                transcript_area.y + y,
                transcript_area.width,
                1,
            );
            self.transcript_line(entry).render(line_area, buf);
        }

        self.pane.render(pane_area, buf);

        match &self.screen {
            Some(Screen::ReportUser(view)) => view.render(area, buf),
            Some(Screen::CannedResponses(view)) => view.render(area, buf),
            Some(Screen::RoomInfo(view)) => view.render(area, buf),
            None => {}
        }
    }

    pub fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        match &self.screen {
            Some(Screen::ReportUser(view)) => view.cursor_pos(area),
            Some(_) => None,
            None => {
                let [_, _, pane_area] = self.layout(area);
                self.pane.cursor_pos(pane_area)
            }
        }
    }
}
