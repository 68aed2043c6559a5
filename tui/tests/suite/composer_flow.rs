use assert_matches::assert_matches;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use pretty_assertions::assert_eq;
use relay_core::autocomplete::AutocompleteItem;
use relay_core::config::Config;
use relay_core::config::DirectoryUser;
use relay_core::memory::RoomServiceCall;
use relay_core::room::RoomType;
use relay_core::services::Message;
use relay_tui::app::Screen;
use relay_tui::app::TranscriptEntry;
use relay_tui::composer_input::MicOrSend;

use super::harness::Harness;
use super::harness::context_for;

fn config() -> Config {
    let mut config = Config::default();
    config.directory.users = vec![DirectoryUser {
        id: Some("U1".to_string()),
        username: "john".to_string(),
        name: None,
    }];
    config
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn mention_is_suggested_applied_and_sent() {
    let mut h = Harness::new(config()).await;

    h.type_text("hello @jo").await;
    // Nothing is classified until typing pauses.
    assert!(!h.app.pane().is_popup_visible());
    h.settle().await;

    assert_matches!(
        h.app.pane().popup_items(),
        [AutocompleteItem::User { username, .. }] if username == "john"
    );
    assert!(h.screen(40, 12).contains("› john"));

    h.press(KeyCode::Enter).await;
    h.drain().await;
    assert_eq!(h.text(), "hello @john ");
    assert_eq!(h.app.pane().composer().get_selection().cursor(), 12);
    assert!(!h.app.pane().is_popup_visible());

    h.type_text("hi").await;
    h.press(KeyCode::Enter).await;
    h.settle().await;

    assert_eq!(
        h.app.transcript(),
        &[TranscriptEntry::Message {
            text: "hello @john hi".to_string(),
            edited: false,
        }]
    );
    assert_eq!(h.text(), "");
    assert_eq!(h.app.pane().mic_or_send(), MicOrSend::Mic);

    // The cleared draft stops the typing indicator.
    assert_eq!(
        h.room_services.calls().last(),
        Some(&RoomServiceCall::Typing {
            room_id: "GENERAL".to_string(),
            is_typing: false,
        })
    );
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn typing_flips_the_button_to_send() {
    let mut h = Harness::new(config()).await;
    assert!(h.screen(40, 6).contains("[mic]"));

    h.type_text("x").await;
    h.drain().await;
    assert_eq!(h.app.pane().mic_or_send(), MicOrSend::Send);
    assert!(h.screen(40, 6).contains("[send]"));

    h.press(KeyCode::Backspace).await;
    h.drain().await;
    assert_eq!(h.app.pane().mic_or_send(), MicOrSend::Mic);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn markdown_toolbar_wraps_the_selection() {
    let mut h = Harness::new(config()).await;
    h.ctrl('t').await;
    assert!(h.screen(60, 8).contains("[✕]  [B]  [I]  [S]"));

    h.type_text("loud").await;
    for _ in 0..4 {
        h.key(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT)).await;
    }
    h.key(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::ALT))
        .await;
    assert_eq!(h.text(), "*loud*");

    // Alt+X is the close button.
    h.key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT))
        .await;
    assert!(!h.app.pane().toolbar().is_visible());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn toolbar_mention_opens_the_user_list() {
    let mut h = Harness::new(config()).await;
    h.key(KeyEvent::new(KeyCode::Char('m'), KeyModifiers::ALT))
        .await;
    assert_eq!(h.text(), "@");
    assert!(h.app.pane().is_popup_visible());

    h.press(KeyCode::Down).await;
    h.press(KeyCode::Tab).await;
    h.drain().await;
    assert_eq!(h.text(), "@all ");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn edit_mode_marks_the_sent_message_as_edited() {
    let mut config = config();
    config.directory.messages = vec![Message {
        id: "m1".to_string(),
        body: "original body".to_string(),
    }];
    let context = relay_tui::composer_input::ComposerContext {
        editing: Some("m1".to_string()),
        ..context_for(&config)
    };
    let mut h = Harness::with_context(config, context).await;
    assert_eq!(h.text(), "original body");
    assert!(h.screen(60, 6).contains("editing"));

    h.type_text(", fixed").await;
    h.press(KeyCode::Enter).await;
    h.settle().await;

    assert_eq!(
        h.app.transcript(),
        &[TranscriptEntry::Message {
            text: "original body, fixed".to_string(),
            edited: true,
        }]
    );
    assert!(!h.app.pane().composer().is_editing());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn livechat_without_canned_responses_opens_the_list() {
    let mut config = config();
    config.room.room_type = RoomType::Livechat;
    let mut h = Harness::new(config).await;

    h.type_text("!gr").await;
    h.settle().await;
    assert_eq!(
        h.app.pane().popup_items(),
        &[AutocompleteItem::NoCannedResponses]
    );

    h.press(KeyCode::Enter).await;
    h.drain().await;
    assert_matches!(h.app.screen(), Some(Screen::CannedResponses(view)) if !view.is_modal());
    assert!(h.screen(80, 12).contains("No canned responses"));
    // The trigger text is left alone.
    assert_eq!(h.text(), "!gr");

    h.press(KeyCode::Esc).await;
    assert!(h.app.screen().is_none());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn recorded_audio_is_confirmed_with_enter() {
    let mut h = Harness::new(config()).await;
    h.ctrl('r').await;
    assert!(h.app.pane().is_recording());
    assert!(h.screen(60, 6).contains("Recording 0:00"));
    assert!(h.screen(60, 6).contains("[→]"));

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
    h.press(KeyCode::Enter).await;
    h.drain().await;
    assert_eq!(
        h.app.transcript(),
        &[TranscriptEntry::System("audio message (0:03)".to_string())]
    );
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn losing_focus_closes_the_popup() {
    let mut h = Harness::new(config()).await;
    h.type_text("@").await;
    h.settle().await;
    assert!(h.app.pane().is_popup_visible());

    h.app
        .handle_tui_event(relay_tui::tui::TuiEvent::FocusLost)
        .await;
    assert!(!h.app.pane().is_popup_visible());
    assert!(!h.app.pane().composer().is_focused());

    h.app
        .handle_tui_event(relay_tui::tui::TuiEvent::FocusGained)
        .await;
    assert!(h.app.pane().composer().is_focused());
}
