//! Terminal lifecycle and the merged stream of terminal input and redraw
//! requests the app loop consumes.

use std::io;
use std::io::IsTerminal;
use std::io::Stdout;
use std::pin::Pin;

use crossterm::cursor::Show;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableFocusChange;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableFocusChange;
use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::execute;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Frame;
use ratatui::backend::CrosstermBackend;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_stream::Stream;

pub use self::frame_requester::FrameRequester;

mod frame_requester;

pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

pub type TuiEventStream = Pin<Box<dyn Stream<Item = TuiEvent> + Send + 'static>>;

#[derive(Debug)]
pub enum TuiEvent {
    Key(KeyEvent),
    Paste(String),
    FocusGained,
    FocusLost,
    Draw,
}

impl TuiEvent {
    /// Translate a crossterm event; `None` for events the app ignores.
    fn from_crossterm(event: Event) -> Option<Self> {
        match event {
            Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                Some(TuiEvent::Key(key_event))
            }
            Event::Paste(pasted) => Some(TuiEvent::Paste(pasted)),
            Event::FocusGained => Some(TuiEvent::FocusGained),
            Event::FocusLost => Some(TuiEvent::FocusLost),
            Event::Resize(..) => Some(TuiEvent::Draw),
            _ => None,
        }
    }
}

/// Switch the terminal into the modes the client runs in: raw input,
/// bracketed paste and the alternate screen.
fn enter_modes() -> io::Result<()> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, EnableBracketedPaste)?;
    // Focus reporting is optional; the composer stays focused without it.
    let _ = execute!(io::stdout(), EnableFocusChange);
    Ok(())
}

/// Undo [`init`]. Safe to call more than once.
pub fn restore() -> io::Result<()> {
    let _ = execute!(io::stdout(), DisableFocusChange);
    execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    let _ = execute!(io::stdout(), Show);
    Ok(())
}

pub fn init() -> io::Result<Terminal> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(io::Error::other(
            "relay-tui needs an interactive terminal on stdin and stdout",
        ));
    }
    enter_modes()?;

    // Leave the alternate screen before the panic report is printed.
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore();
        previous(info);
    }));

    ratatui::Terminal::new(CrosstermBackend::new(io::stdout()))
}

pub struct Tui {
    terminal: Terminal,
    redraw_tx: broadcast::Sender<()>,
}

impl Tui {
    pub fn new(terminal: Terminal) -> Self {
        // One slot: any number of pending requests collapse into one draw.
        let (redraw_tx, _) = broadcast::channel(1);
        Self {
            terminal,
            redraw_tx,
        }
    }

    pub fn frame_requester(&self) -> FrameRequester {
        FrameRequester::new(self.redraw_tx.clone())
    }

    pub fn event_stream(&self) -> TuiEventStream {
        use tokio_stream::StreamExt;

        let mut input = EventStream::new();
        let mut redraw_rx = self.redraw_tx.subscribe();

        Box::pin(async_stream::stream! {
            loop {
                tokio::select! {
                    Some(Ok(event)) = input.next() => {
                        if let Some(event) = TuiEvent::from_crossterm(event) {
                            yield event;
                        }
                    }
                    received = redraw_rx.recv() => {
                        match received {
                            // A lag still only needs one redraw.
                            Ok(()) | Err(RecvError::Lagged(_)) => {
                                yield TuiEvent::Draw;
                            }
                            Err(RecvError::Closed) => break,
                        }
                    }
                }
            }
        })
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> io::Result<()> {
        self.terminal.draw(render).map(|_| ())
    }
}
