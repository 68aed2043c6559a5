//! Collaborators the composer talks to.
//!
//! These stand in for the client's local database, its remote API client and
//! the typing-indicator broadcast. The composer only ever sees them through
//! these traits; [`crate::memory`] and [`crate::draft`] provide the
//! implementations used by the terminal client and by tests.

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;
use crate::commands::CommandPreviewItem;
use crate::commands::SlashCommandRecord;
use crate::room::RoomSubscription;

/// A stored chat message. Only the body matters to the composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub body: String,
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Message>>;
}

#[async_trait]
pub trait CommandStore: Send + Sync {
    async fn get(&self, command: &str) -> Result<Option<SlashCommandRecord>>;
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn get(&self, room_id: &str) -> Result<Option<RoomSubscription>>;
}

/// Everything needed to run a command preview on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPreviewRequest {
    pub command: String,
    pub params: String,
    pub room_id: String,
    pub preview: CommandPreviewItem,
    pub trigger_id: String,
    pub thread_id: Option<String>,
}

/// Fire-and-forget calls into the remote service.
#[async_trait]
pub trait RoomServices: Send + Sync {
    async fn notify_typing(&self, room_id: &str, is_typing: bool) -> Result<()>;

    async fn execute_command_preview(&self, request: CommandPreviewRequest) -> Result<()>;

    async fn report_user(&self, user_id: &str, description: &str) -> Result<()>;
}
