//! Application-level events used to coordinate UI actions.
//!
//! `AppEvent` is the message bus between widgets and the top-level `App`
//! loop. Widgets emit events to request work that must happen at the app
//! layer (navigation, debounced classification, closing the popup on the next
//! frame) without needing access to `App` internals.

use std::time::Duration;

use relay_core::report::ReportUserParams;
use relay_core::room::RoomSubscription;
use relay_core::room::RoomType;

use crate::composer_input::ComposerId;
use crate::composer_input::MicOrSend;

/// Screens the composer can ask the app to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Switch the composer to another room.
    Room(RoomSubscription),
    RoomInfo {
        room_type: RoomType,
        room_id: String,
    },
    /// The canned responses list; `modal` in master-detail layouts.
    CannedResponses {
        room_id: String,
        modal: bool,
    },
    ReportUser(ReportUserParams),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The draft of `composer` has been quiet for the debounce delay; re-run
    /// trigger classification against this text.
    ClassifyDraft { composer: ComposerId, text: String },

    /// The composer's text went from empty to non-empty or back.
    ComposerModeChanged(MicOrSend),

    /// Close the autocomplete popup. Sent after a suggestion is applied so
    /// the popup closes on the next loop iteration.
    CloseAutocomplete,

    Navigate(Route),

    /// A recorded audio message was confirmed with the review button.
    AudioMessageRecorded(Duration),

    /// Leave the app.
    Exit,
}
