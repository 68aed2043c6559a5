//! Autocomplete suggestions and how a chosen suggestion is written back into
//! the draft.

use crate::commands::CommandPreviewItem;
use crate::markdown::Splice;
use crate::mention::strip_query;
use crate::selection::Selection;
use crate::selection::clamp_to_char_boundary;
use crate::trigger::TriggerKind;

/// Room-wide mentions offered at the top of the user list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BroadcastMention {
    All,
    Here,
}

impl BroadcastMention {
    pub fn keyword(self) -> &'static str {
        match self {
            BroadcastMention::All => "all",
            BroadcastMention::Here => "here",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BroadcastMention::All => "Notify all in this room",
            BroadcastMention::Here => "Notify active users in this room",
        }
    }
}

/// One row of the autocomplete popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutocompleteItem {
    /// Placeholder while suggestions are being fetched.
    Loading,
    User {
        username: String,
        name: Option<String>,
    },
    Broadcast(BroadcastMention),
    Room {
        name: String,
        fname: Option<String>,
    },
    Emoji {
        name: String,
    },
    Command {
        command: String,
        description: Option<String>,
    },
    CommandPreview {
        command: String,
        params: String,
        preview: CommandPreviewItem,
    },
    CannedResponse {
        shortcut: String,
        text: String,
    },
    /// Shown for canned-response queries when the room has none; selecting it
    /// opens the canned responses list instead of inserting text.
    NoCannedResponses,
}

impl AutocompleteItem {
    pub fn kind(&self) -> TriggerKind {
        match self {
            AutocompleteItem::Loading => TriggerKind::None,
            AutocompleteItem::User { .. } | AutocompleteItem::Broadcast(_) => {
                TriggerKind::Mention
            }
            AutocompleteItem::Room { .. } => TriggerKind::Channel,
            AutocompleteItem::Emoji { .. } => TriggerKind::Emoji,
            AutocompleteItem::Command { .. } => TriggerKind::SlashCommand,
            AutocompleteItem::CommandPreview { .. } => TriggerKind::SlashCommandPreview,
            AutocompleteItem::CannedResponse { .. } | AutocompleteItem::NoCannedResponses => {
                TriggerKind::CannedResponse
            }
        }
    }

    /// Text written into the draft when this item is chosen.
    ///
    /// Emoji keep the `:` marker already in the draft and gain the closing one.
    pub fn replacement(&self) -> Option<String> {
        match self {
            AutocompleteItem::User { username, .. } => Some(username.clone()),
            AutocompleteItem::Broadcast(broadcast) => Some(broadcast.keyword().to_string()),
            AutocompleteItem::Room { name, .. } => Some(name.clone()),
            AutocompleteItem::Emoji { name } => Some(format!("{name}:")),
            AutocompleteItem::Command { command, .. } => Some(command.clone()),
            AutocompleteItem::CannedResponse { text, .. } => Some(text.clone()),
            AutocompleteItem::Loading
            | AutocompleteItem::CommandPreview { .. }
            | AutocompleteItem::NoCannedResponses => None,
        }
    }

    /// Primary label in the popup.
    pub fn title(&self) -> String {
        match self {
            AutocompleteItem::Loading => "Loading…".to_string(),
            AutocompleteItem::User { username, name } => {
                name.clone().unwrap_or_else(|| username.clone())
            }
            AutocompleteItem::Broadcast(broadcast) => broadcast.keyword().to_string(),
            AutocompleteItem::Room { name, fname } => fname.clone().unwrap_or_else(|| name.clone()),
            AutocompleteItem::Emoji { name } => format!(":{name}:"),
            AutocompleteItem::Command { command, .. } => format!("/{command}"),
            AutocompleteItem::CommandPreview { preview, .. } => preview.value.clone(),
            AutocompleteItem::CannedResponse { shortcut, .. } => format!("!{shortcut}"),
            AutocompleteItem::NoCannedResponses => "No canned responses".to_string(),
        }
    }

    /// Secondary label in the popup.
    pub fn subtitle(&self) -> Option<String> {
        match self {
            AutocompleteItem::User { username, name } => name.as_ref().map(|_| username.clone()),
            AutocompleteItem::Broadcast(broadcast) => Some(broadcast.description().to_string()),
            AutocompleteItem::Room { name, fname } => fname.as_ref().map(|_| name.clone()),
            AutocompleteItem::Command { description, .. } => description.clone(),
            AutocompleteItem::CannedResponse { text, .. } => Some(text.clone()),
            AutocompleteItem::NoCannedResponses => {
                Some("Open the canned responses list".to_string())
            }
            AutocompleteItem::Loading
            | AutocompleteItem::Emoji { .. }
            | AutocompleteItem::CommandPreview { .. } => None,
        }
    }
}

/// Replace the in-progress query before the cursor with `replacement`.
///
/// The query is stripped from `text[..cursor]` (keeping its marker), then
/// `replacement` and a single space are inserted and the rest of the text
/// after the cursor is kept. For canned responses the prefix is cut at the
/// `!` marker instead, so the marker itself is replaced. The cursor ends up
/// right after the inserted space.
pub fn splice_suggestion(
    text: &str,
    selection: Selection,
    kind: TriggerKind,
    replacement: &str,
) -> Splice {
    let cursor = clamp_to_char_boundary(text, selection.cursor());
    let before_cursor = &text[..cursor];
    let prefix = if kind == TriggerKind::CannedResponse {
        match before_cursor.rfind('!') {
            Some(marker) => &before_cursor[..marker],
            None => strip_query(before_cursor),
        }
    } else {
        strip_query(before_cursor)
    };

    let mut new_text = String::with_capacity(text.len() + replacement.len() + 1);
    new_text.push_str(prefix);
    new_text.push_str(replacement);
    new_text.push(' ');
    let new_cursor = new_text.len();
    new_text.push_str(&text[cursor..]);

    Splice {
        text: new_text,
        selection: Selection::caret(new_cursor),
    }
}
