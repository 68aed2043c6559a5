//! The collaborators a running client talks to, bundled for cheap cloning.

use std::path::Path;
use std::sync::Arc;

use relay_core::config::Config;
use relay_core::draft::DRAFTS_FILENAME;
use relay_core::draft::DraftStore;
use relay_core::draft::FileDraftStore;
use relay_core::draft::InMemoryDraftStore;
use relay_core::memory::InMemoryCommands;
use relay_core::memory::InMemoryMessages;
use relay_core::memory::InMemorySubscriptions;
use relay_core::memory::LoggingRoomServices;
use relay_core::services::CommandStore;
use relay_core::services::MessageStore;
use relay_core::services::RoomServices;
use relay_core::services::SubscriptionStore;
use relay_core::suggestions::DirectorySuggestions;
use relay_core::suggestions::SuggestionSource;

#[derive(Clone)]
pub struct Services {
    pub drafts: Arc<dyn DraftStore>,
    pub messages: Arc<dyn MessageStore>,
    pub commands: Arc<dyn CommandStore>,
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub room_services: Arc<dyn RoomServices>,
    pub suggestions: Arc<dyn SuggestionSource>,
}

impl Services {
    /// Services seeded from `config`, with drafts persisted under
    /// `relay_home`.
    pub fn from_config(config: &Config, relay_home: &Path) -> Self {
        let drafts = Arc::new(FileDraftStore::new(relay_home.join(DRAFTS_FILENAME)));
        Self::with_drafts(config, drafts, Arc::new(LoggingRoomServices::new()))
    }

    /// Fully in-memory services; nothing touches the filesystem.
    pub fn in_memory(config: &Config, room_services: Arc<dyn RoomServices>) -> Self {
        Self::with_drafts(config, Arc::new(InMemoryDraftStore::new()), room_services)
    }

    pub fn with_drafts(
        config: &Config,
        drafts: Arc<dyn DraftStore>,
        room_services: Arc<dyn RoomServices>,
    ) -> Self {
        let mut subscriptions = config.directory.rooms.clone();
        let current = config.room.subscription();
        if !subscriptions.iter().any(|room| room.id == current.id) {
            subscriptions.push(current);
        }
        Self {
            drafts,
            messages: Arc::new(InMemoryMessages::new(config.directory.messages.clone())),
            commands: Arc::new(InMemoryCommands::new(config.commands.clone())),
            subscriptions: Arc::new(InMemorySubscriptions::new(subscriptions)),
            room_services,
            suggestions: Arc::new(DirectorySuggestions::new(
                config.directory.clone(),
                config.commands.clone(),
            )),
        }
    }
}
