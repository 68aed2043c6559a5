//! Resolution of `#hashtag` references in rendered messages.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;
use crate::room::RoomSubscription;
use crate::room::RoomType;
use crate::services::SubscriptionStore;

/// A channel referenced by a message, as attached by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChannel {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// Where pressing a resolved hashtag leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashtagNavigation {
    /// The user is subscribed; open the room directly.
    OpenRoom(RoomSubscription),
    /// Not subscribed; show the room info screen instead.
    RoomInfo { room_type: RoomType, room_id: String },
}

// A `#` at the start of the text or after whitespace, followed by a channel
// name. A trailing `.` ends the sentence rather than the name. `\w` is ASCII
// only in regex-lite, so non-ASCII scalars are listed explicitly.
static HASHTAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"(?:^|\s)#([\w\x{80}-\x{10FFFF}-]+(?:\.[\w\x{80}-\x{10FFFF}-]+)*)") {
        Ok(regex) => regex,
        // Panic is ok thanks to `load_regex` test.
        Err(err) => panic!("invalid hashtag regex: {err}"),
    }
});

/// A piece of message text: plain text or a `#hashtag` (without the `#`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSegment<'a> {
    Text(&'a str),
    Hashtag(&'a str),
}

pub fn split_hashtags(text: &str) -> Vec<MessageSegment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;
    for captures in HASHTAG_REGEX.captures_iter(text) {
        let Some(name) = captures.get(1) else {
            continue;
        };
        let hash = name.start() - 1;
        if hash > last {
            segments.push(MessageSegment::Text(&text[last..hash]));
        }
        segments.push(MessageSegment::Hashtag(name.as_str()));
        last = name.end();
    }
    if last < text.len() {
        segments.push(MessageSegment::Text(&text[last..]));
    }
    segments
}

/// The channel named `hashtag`, if the message carries one.
pub fn resolve<'a>(hashtag: &str, channels: &'a [UserChannel]) -> Option<&'a UserChannel> {
    channels.iter().find(|channel| channel.name == hashtag)
}

/// Decide where a press on `hashtag` navigates. `None` for unknown hashtags,
/// which render as plain text and have no press action.
pub async fn navigation_for(
    hashtag: &str,
    channels: &[UserChannel],
    subscriptions: &dyn SubscriptionStore,
) -> Result<Option<HashtagNavigation>> {
    let Some(channel) = resolve(hashtag, channels) else {
        return Ok(None);
    };
    let navigation = match subscriptions.get(&channel.id).await? {
        Some(subscription) => HashtagNavigation::OpenRoom(subscription),
        None => HashtagNavigation::RoomInfo {
            room_type: RoomType::Channel,
            room_id: channel.id.clone(),
        },
    };
    Ok(Some(navigation))
}
