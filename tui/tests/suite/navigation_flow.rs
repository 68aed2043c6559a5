use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use crossterm::event::KeyCode;
use pretty_assertions::assert_eq;
use relay_core::config::Config;
use relay_core::config::DirectoryUser;
use relay_core::draft::DraftKey;
use relay_core::draft::DraftStore as _;
use relay_core::memory::InMemorySubscriptions;
use relay_core::memory::LoggingRoomServices;
use relay_core::memory::RoomServiceCall;
use relay_core::room::RoomSubscription;
use relay_core::room::RoomType;
use relay_core::trigger::AutocompleteParams;
use relay_core::trigger::TriggerKind;
use relay_tui::app::Screen;
use relay_tui::app::TranscriptEntry;
use relay_tui::app_event::AppEvent;
use relay_tui::app_event::Route;
use relay_tui::services::Services;

use super::harness::Harness;
use super::harness::context_for;

fn room(id: &str, name: &str) -> RoomSubscription {
    RoomSubscription {
        id: id.to_string(),
        name: name.to_string(),
        fname: None,
        room_type: RoomType::Channel,
    }
}

fn config() -> Config {
    let mut config = Config::default();
    config.directory.users = vec![DirectoryUser {
        id: Some("U1".to_string()),
        username: "john".to_string(),
        name: Some("John Doe".to_string()),
    }];
    config.directory.rooms = vec![room("R1", "dev"), room("R2", "random")];
    config
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn report_command_opens_the_form_and_submits() {
    let mut h = Harness::new(config()).await;
    h.type_text("/report @john").await;
    h.press(KeyCode::Enter).await;
    h.drain().await;

    assert_matches!(
        h.app.screen(),
        Some(Screen::ReportUser(view)) if view.params().user_id == "U1"
    );
    let rendered = h.screen(80, 20);
    assert!(rendered.contains("Report user"), "{rendered}");
    assert!(rendered.contains("John Doe"), "{rendered}");
    assert!(rendered.contains("@john"), "{rendered}");

    // A blank description is refused inline.
    h.press(KeyCode::Enter).await;
    assert!(h.screen(80, 20).contains("a description is required"));
    assert!(
        !h.room_services
            .calls()
            .iter()
            .any(|call| matches!(call, RoomServiceCall::ReportUser { .. }))
    );

    h.type_text("sends spam").await;
    h.press(KeyCode::Enter).await;

    assert!(h.app.screen().is_none());
    assert!(h.room_services.calls().contains(&RoomServiceCall::ReportUser {
        user_id: "U1".to_string(),
        description: "sends spam".to_string(),
    }));
    assert_eq!(
        h.app.transcript().last(),
        Some(&TranscriptEntry::System("reported @john".to_string()))
    );
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn reporting_an_unknown_user_is_a_notice() {
    let mut h = Harness::new(config()).await;
    h.type_text("/report nobody").await;
    h.press(KeyCode::Enter).await;
    h.drain().await;
    assert!(h.app.screen().is_none());
    assert_eq!(
        h.app.transcript(),
        &[TranscriptEntry::System("unknown user @nobody".to_string())]
    );
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn hashtag_to_unsubscribed_channel_opens_room_info() {
    let config = config();
    let room_services = Arc::new(LoggingRoomServices::new());
    let mut services = Services::in_memory(&config, room_services.clone());
    // Subscribed to the current room only.
    services.subscriptions = Arc::new(InMemorySubscriptions::new(vec![
        config.room.subscription(),
    ]));
    let context = context_for(&config);
    let mut h = Harness::with_services(config, context, services, room_services).await;

    h.type_text("see #random").await;
    h.press(KeyCode::Enter).await;
    assert!(h.screen(60, 8).contains("see  #random"));

    h.ctrl('o').await;
    assert_matches!(h.app.screen(), Some(Screen::RoomInfo(view)) if view.room_id() == "R2");
    let rendered = h.screen(60, 12);
    assert!(rendered.contains("Room info"), "{rendered}");
    assert!(rendered.contains("#random"), "{rendered}");

    h.press(KeyCode::Esc).await;
    assert!(h.app.screen().is_none());
    assert_eq!(h.app.room().id, "GENERAL");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn hashtag_to_subscribed_channel_switches_rooms_and_keeps_drafts() {
    let mut h = Harness::new(config()).await;
    h.type_text("ask in #dev or #nowhere").await;
    h.press(KeyCode::Enter).await;

    // Unknown hashtags stay plain text.
    assert!(h.screen(60, 8).contains("ask in  #dev  or #nowhere"));

    h.type_text("unsent").await;
    h.ctrl('o').await;
    assert_eq!(h.app.room().id, "R1");
    assert_eq!(h.text(), "");
    assert_eq!(
        h.app.transcript().last(),
        Some(&TranscriptEntry::System("switched to #dev".to_string()))
    );
    assert!(h.screen(60, 8).contains("Message #dev"));

    let saved = h
        .services
        .drafts
        .load(&DraftKey::new("GENERAL", None))
        .await
        .unwrap();
    assert_eq!(saved.as_deref(), Some("unsent"));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn classification_queued_before_a_room_switch_is_dropped() {
    let mut h = Harness::new(config()).await;
    h.type_text("@jo").await;
    // The debounce fires and queues a classification that is not delivered yet.
    tokio::time::sleep(Duration::from_millis(350)).await;

    assert!(
        h.app
            .handle_event(AppEvent::Navigate(Route::Room(room("R2", "random"))))
            .await
    );
    h.drain().await;

    assert_eq!(h.app.room().id, "R2");
    assert_eq!(h.text(), "");
    assert_eq!(h.app.pane().autocomplete(), &AutocompleteParams::cleared());
    assert!(
        !h.room_services
            .calls()
            .iter()
            .any(|call| matches!(call, RoomServiceCall::Typing { .. })),
        "{:?}",
        h.room_services.calls()
    );

    // The new composer still classifies its own draft.
    h.type_text("@jo").await;
    h.settle().await;
    assert_eq!(
        h.app.pane().autocomplete(),
        &AutocompleteParams::new(TriggerKind::Mention, "jo")
    );
    assert!(h.room_services.calls().contains(&RoomServiceCall::Typing {
        room_id: "R2".to_string(),
        is_typing: true,
    }));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn ctrl_c_exits() {
    let mut h = Harness::new(config()).await;
    h.ctrl('c').await;
    h.drain().await;
    assert!(!h.running);
}
