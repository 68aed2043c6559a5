use serde::Deserialize;
use serde::Serialize;
use strum_macros::EnumString;

/// Room kinds, serialized with the server's one-letter codes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString,
)]
pub enum RoomType {
    #[serde(rename = "d")]
    #[strum(serialize = "d", serialize = "direct")]
    Direct,
    #[default]
    #[serde(rename = "c")]
    #[strum(serialize = "c", serialize = "channel")]
    Channel,
    #[serde(rename = "p")]
    #[strum(serialize = "p", serialize = "private")]
    Private,
    #[serde(rename = "l")]
    #[strum(serialize = "l", serialize = "livechat")]
    Livechat,
}

/// The current user's subscription to a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSubscription {
    pub id: String,
    pub name: String,
    /// Display name; preferred over `name` when present.
    #[serde(default)]
    pub fname: Option<String>,
    #[serde(rename = "type", default)]
    pub room_type: RoomType,
}

impl RoomSubscription {
    pub fn title(&self) -> &str {
        self.fname
            .as_deref()
            .filter(|fname| !fname.is_empty())
            .unwrap_or(&self.name)
    }
}

/// Placeholder shown in an empty composer.
pub fn composer_placeholder(
    subscription: Option<&RoomSubscription>,
    thread_id: Option<&str>,
) -> String {
    if thread_id.is_some() {
        return "Add thread reply".to_string();
    }
    let mut placeholder = "Message ".to_string();
    if let Some(subscription) = subscription {
        placeholder.push(if subscription.room_type == RoomType::Direct {
            '@'
        } else {
            '#'
        });
        placeholder.push_str(subscription.title());
    }
    placeholder
}
