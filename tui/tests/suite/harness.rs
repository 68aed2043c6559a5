//! Drives an [`App`] the way the terminal loop does, without a terminal.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use relay_core::config::Config;
use relay_core::memory::LoggingRoomServices;
use relay_tui::App;
use relay_tui::AppInit;
use relay_tui::app_event::AppEvent;
use relay_tui::app_event_sender::AppEventSender;
use relay_tui::composer_input::ComposerContext;
use relay_tui::services::Services;
use relay_tui::tui::TuiEvent;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::unbounded_channel;

/// Longer than the default classification debounce.
const SETTLE: Duration = Duration::from_millis(350);

pub(crate) struct Harness {
    pub app: App,
    pub rx: UnboundedReceiver<AppEvent>,
    pub room_services: Arc<LoggingRoomServices>,
    pub services: Services,
    /// False once an event asked the app to exit.
    pub running: bool,
}

pub(crate) fn context_for(config: &Config) -> ComposerContext {
    ComposerContext {
        room_id: config.room.id.clone(),
        subscription: Some(config.room.subscription()),
        master_detail: config.composer.master_detail,
        ..ComposerContext::default()
    }
}

impl Harness {
    pub async fn new(config: Config) -> Self {
        let context = context_for(&config);
        Self::with_context(config, context).await
    }

    pub async fn with_context(config: Config, context: ComposerContext) -> Self {
        let room_services = Arc::new(LoggingRoomServices::new());
        let services = Services::in_memory(&config, room_services.clone());
        Self::with_services(config, context, services, room_services).await
    }

    pub async fn with_services(
        config: Config,
        context: ComposerContext,
        services: Services,
        room_services: Arc<LoggingRoomServices>,
    ) -> Self {
        let (tx, rx) = unbounded_channel();
        let app = App::new(
            AppInit {
                config,
                services: services.clone(),
                context,
            },
            AppEventSender::new(tx),
        )
        .await;
        Self {
            app,
            rx,
            room_services,
            services,
            running: true,
        }
    }

    pub async fn key(&mut self, key_event: KeyEvent) {
        self.app.handle_tui_event(TuiEvent::Key(key_event)).await;
    }

    pub async fn press(&mut self, code: KeyCode) {
        self.key(KeyEvent::from(code)).await;
    }

    pub async fn ctrl(&mut self, c: char) {
        self.key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
            .await;
    }

    pub async fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c)).await;
        }
    }

    /// Deliver everything already queued on the app event bus.
    pub async fn drain(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            if !self.app.handle_event(event).await {
                self.running = false;
            }
        }
    }

    /// Let the debounce window elapse, then deliver queued events.
    pub async fn settle(&mut self) {
        tokio::time::sleep(SETTLE).await;
        self.drain().await;
    }

    pub fn text(&self) -> String {
        self.app.pane().composer().get_text().to_string()
    }

    pub fn screen(&self, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        self.app.render(area, &mut buf);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
