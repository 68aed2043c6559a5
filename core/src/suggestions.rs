//! Candidate lists for the autocomplete popup.

use async_trait::async_trait;

use crate::autocomplete::AutocompleteItem;
use crate::autocomplete::BroadcastMention;
use crate::commands::SlashCommandRecord;
use crate::config::Directory;
use crate::trigger::AutocompleteParams;
use crate::trigger::TriggerKind;

/// Maximum number of rows offered for one query.
pub const MAX_SUGGESTIONS: usize = 20;

#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn suggestions(&self, params: &AutocompleteParams) -> Vec<AutocompleteItem>;
}

/// Suggestions served from the local [`Directory`] and command list.
#[derive(Debug, Clone, Default)]
pub struct DirectorySuggestions {
    directory: Directory,
    commands: Vec<SlashCommandRecord>,
}

impl DirectorySuggestions {
    pub fn new(directory: Directory, commands: Vec<SlashCommandRecord>) -> Self {
        Self {
            directory,
            commands,
        }
    }

    fn mentions(&self, query: &str) -> Vec<AutocompleteItem> {
        let broadcasts = [BroadcastMention::All, BroadcastMention::Here]
            .into_iter()
            .filter(|broadcast| matches_query(broadcast.keyword(), query))
            .map(AutocompleteItem::Broadcast);
        let users = self
            .directory
            .users
            .iter()
            .filter(|user| {
                matches_query(&user.username, query)
                    || user.name.as_deref().is_some_and(|name| matches_query(name, query))
            })
            .map(|user| AutocompleteItem::User {
                username: user.username.clone(),
                name: user.name.clone(),
            });
        users.chain(broadcasts).collect()
    }

    fn rooms(&self, query: &str) -> Vec<AutocompleteItem> {
        self.directory
            .rooms
            .iter()
            .filter(|room| matches_query(&room.name, query))
            .map(|room| AutocompleteItem::Room {
                name: room.name.clone(),
                fname: room.fname.clone(),
            })
            .collect()
    }

    fn emoji(&self, query: &str) -> Vec<AutocompleteItem> {
        self.directory
            .emoji
            .iter()
            .filter(|name| matches_query(name, query))
            .map(|name| AutocompleteItem::Emoji { name: name.clone() })
            .collect()
    }

    fn commands(&self, query: &str) -> Vec<AutocompleteItem> {
        self.commands
            .iter()
            .filter(|record| matches_query(&record.command, query))
            .map(|record| AutocompleteItem::Command {
                command: record.command.clone(),
                description: record.description.clone(),
            })
            .collect()
    }

    fn previews(&self, command: &str, params: &str) -> Vec<AutocompleteItem> {
        self.commands
            .iter()
            .filter(|record| record.provides_preview && record.command == command)
            .flat_map(|record| record.previews.iter())
            .map(|preview| AutocompleteItem::CommandPreview {
                command: command.to_string(),
                params: params.to_string(),
                preview: preview.clone(),
            })
            .collect()
    }

    fn canned_responses(&self, query: &str) -> Vec<AutocompleteItem> {
        let matches: Vec<AutocompleteItem> = self
            .directory
            .canned_responses
            .iter()
            .filter(|canned| matches_query(&canned.shortcut, query))
            .map(|canned| AutocompleteItem::CannedResponse {
                shortcut: canned.shortcut.clone(),
                text: canned.text.clone(),
            })
            .collect();
        if matches.is_empty() {
            vec![AutocompleteItem::NoCannedResponses]
        } else {
            matches
        }
    }
}

#[async_trait]
impl SuggestionSource for DirectorySuggestions {
    async fn suggestions(&self, params: &AutocompleteParams) -> Vec<AutocompleteItem> {
        let query = params.text.as_str();
        let mut items = match params.kind {
            TriggerKind::None => Vec::new(),
            TriggerKind::Mention => self.mentions(query),
            TriggerKind::Channel => self.rooms(query),
            TriggerKind::Emoji => self.emoji(query),
            TriggerKind::SlashCommand => self.commands(query),
            TriggerKind::SlashCommandPreview => self.previews(query, &params.params),
            TriggerKind::CannedResponse => self.canned_responses(query),
        };
        items.truncate(MAX_SUGGESTIONS);
        items
    }
}

/// Case-insensitive prefix match.
fn matches_query(candidate: &str, query: &str) -> bool {
    candidate.to_lowercase().starts_with(&query.to_lowercase())
}
