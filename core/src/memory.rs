//! In-memory collaborators.
//!
//! The terminal client seeds these from the `[directory]` and `[[commands]]`
//! sections of the config; tests build them directly.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::PoisonError;

use async_trait::async_trait;
use tracing::info;

use crate::Result;
use crate::commands::SlashCommandRecord;
use crate::room::RoomSubscription;
use crate::services::CommandPreviewRequest;
use crate::services::CommandStore;
use crate::services::Message;
use crate::services::MessageStore;
use crate::services::RoomServices;
use crate::services::SubscriptionStore;

#[derive(Debug, Default)]
pub struct InMemoryCommands {
    commands: HashMap<String, SlashCommandRecord>,
}

impl InMemoryCommands {
    pub fn new(commands: Vec<SlashCommandRecord>) -> Self {
        Self {
            commands: commands
                .into_iter()
                .map(|record| (record.command.clone(), record))
                .collect(),
        }
    }
}

#[async_trait]
impl CommandStore for InMemoryCommands {
    async fn get(&self, command: &str) -> Result<Option<SlashCommandRecord>> {
        Ok(self.commands.get(command).cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryMessages {
    messages: HashMap<String, Message>,
}

impl InMemoryMessages {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages: messages
                .into_iter()
                .map(|message| (message.id.clone(), message))
                .collect(),
        }
    }
}

#[async_trait]
impl MessageStore for InMemoryMessages {
    async fn get(&self, id: &str) -> Result<Option<Message>> {
        Ok(self.messages.get(id).cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemorySubscriptions {
    subscriptions: HashMap<String, RoomSubscription>,
}

impl InMemorySubscriptions {
    pub fn new(subscriptions: Vec<RoomSubscription>) -> Self {
        Self {
            subscriptions: subscriptions
                .into_iter()
                .map(|subscription| (subscription.id.clone(), subscription))
                .collect(),
        }
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptions {
    async fn get(&self, room_id: &str) -> Result<Option<RoomSubscription>> {
        Ok(self.subscriptions.get(room_id).cloned())
    }
}

/// A call made through [`RoomServices`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomServiceCall {
    Typing { room_id: String, is_typing: bool },
    CommandPreview(CommandPreviewRequest),
    ReportUser { user_id: String, description: String },
}

/// Room services that log every call and keep a record of it.
///
/// Used by the terminal client, which has no server to talk to.
#[derive(Debug, Default)]
pub struct LoggingRoomServices {
    calls: Mutex<Vec<RoomServiceCall>>,
}

impl LoggingRoomServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RoomServiceCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: RoomServiceCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

#[async_trait]
impl RoomServices for LoggingRoomServices {
    async fn notify_typing(&self, room_id: &str, is_typing: bool) -> Result<()> {
        info!(room_id, is_typing, "typing indicator");
        self.record(RoomServiceCall::Typing {
            room_id: room_id.to_string(),
            is_typing,
        });
        Ok(())
    }

    async fn execute_command_preview(&self, request: CommandPreviewRequest) -> Result<()> {
        info!(
            command = %request.command,
            params = %request.params,
            preview = %request.preview.id,
            trigger_id = %request.trigger_id,
            "executing command preview"
        );
        self.record(RoomServiceCall::CommandPreview(request));
        Ok(())
    }

    async fn report_user(&self, user_id: &str, description: &str) -> Result<()> {
        info!(user_id, "reporting user");
        self.record(RoomServiceCall::ReportUser {
            user_id: user_id.to_string(),
            description: description.to_string(),
        });
        Ok(())
    }
}
