//! Autocomplete trigger classification.
//!
//! Given the draft and the cursor, decide which (if any) autocomplete popup
//! should be open and what it should search for. This is a priority-ordered
//! match on the token that ends at the cursor, not a grammar:
//!
//! 1. A message that starts with `/` is a slash command. `/cmd params` with a
//!    previewable `cmd` yields a preview trigger; otherwise a `/` token (or an
//!    empty token right after the command) yields the generic command popup.
//! 2. An empty token closes the popup.
//! 3. `#`, `@` and `:` tokens open the channel, mention and emoji popups.
//! 4. `!` tokens open canned responses, but only in livechat rooms.
//!
//! At most one trigger is active at a time.

use tracing::debug;

use crate::commands::parse_command_invocation;
use crate::mention::last_token;
use crate::room::RoomType;
use crate::services::CommandStore;

/// Which popup an autocomplete query is for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    #[default]
    None,
    Mention,
    Channel,
    Emoji,
    SlashCommand,
    SlashCommandPreview,
    CannedResponse,
}

impl TriggerKind {
    /// The character that opens this popup, if it has one.
    pub fn marker(self) -> Option<char> {
        match self {
            TriggerKind::Mention => Some('@'),
            TriggerKind::Channel => Some('#'),
            TriggerKind::Emoji => Some(':'),
            TriggerKind::SlashCommand | TriggerKind::SlashCommandPreview => Some('/'),
            TriggerKind::CannedResponse => Some('!'),
            TriggerKind::None => None,
        }
    }
}

/// The query the autocomplete popup should run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutocompleteParams {
    /// Query text typed after the marker (for previews: the command name).
    pub text: String,
    pub kind: TriggerKind,
    /// Extra parameters; the command arguments for previews.
    pub params: String,
}

impl AutocompleteParams {
    pub fn new(kind: TriggerKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
            params: String::new(),
        }
    }

    pub fn preview(command: impl Into<String>, params: impl Into<String>) -> Self {
        Self {
            text: command.into(),
            kind: TriggerKind::SlashCommandPreview,
            params: params.into(),
        }
    }

    /// No popup.
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.kind != TriggerKind::None
    }
}

/// Classify the token under the cursor.
///
/// Command lookups only decide between the preview and the generic command
/// popup; a failed lookup is treated as "no preview".
pub async fn classify(
    text: &str,
    cursor: usize,
    room_type: Option<RoomType>,
    commands: &dyn CommandStore,
) -> AutocompleteParams {
    if text.is_empty() {
        return AutocompleteParams::cleared();
    }

    let token = last_token(text, cursor);

    if text.starts_with('/') {
        if let Some((command, params)) = parse_command_invocation(text) {
            match commands.get(command).await {
                Ok(Some(record)) if record.provides_preview => {
                    return AutocompleteParams::preview(command, params);
                }
                Ok(_) => {}
                Err(err) => debug!("slash command lookup for `{command}` failed: {err}"),
            }
        }
        if token.is_empty() {
            return AutocompleteParams::new(TriggerKind::SlashCommand, "");
        }
        if let Some(query) = token.strip_prefix('/') {
            return AutocompleteParams::new(TriggerKind::SlashCommand, query);
        }
    }

    let mut chars = token.chars();
    let Some(marker) = chars.next() else {
        return AutocompleteParams::cleared();
    };
    let query = chars.as_str();
    match marker {
        '#' => AutocompleteParams::new(TriggerKind::Channel, query),
        '@' => AutocompleteParams::new(TriggerKind::Mention, query),
        ':' => AutocompleteParams::new(TriggerKind::Emoji, query),
        '!' if room_type == Some(RoomType::Livechat) => {
            AutocompleteParams::new(TriggerKind::CannedResponse, query)
        }
        _ => AutocompleteParams::cleared(),
    }
}
