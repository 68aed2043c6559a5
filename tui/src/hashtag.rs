//! Inline rendering of `#hashtag` references.
//!
//! A hashtag naming one of the message's channels renders as a pill and can
//! be pressed; anything else renders as plain `#name` text.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Widget;
use relay_core::hashtag::HashtagNavigation;
use relay_core::hashtag::MessageSegment;
use relay_core::hashtag::UserChannel;
use relay_core::hashtag::navigation_for;
use relay_core::hashtag::resolve;
use relay_core::hashtag::split_hashtags;
use relay_core::services::SubscriptionStore;
use tracing::error;

use crate::app_event::Route;

#[derive(Debug, Clone, Copy)]
pub struct Hashtag<'a> {
    hashtag: &'a str,
    channels: &'a [UserChannel],
}

impl<'a> Hashtag<'a> {
    pub fn new(hashtag: &'a str, channels: &'a [UserChannel]) -> Self {
        Self { hashtag, channels }
    }

    pub fn is_resolved(&self) -> bool {
        resolve(self.hashtag, self.channels).is_some()
    }

    pub fn span(&self) -> Span<'static> {
        if self.is_resolved() {
            Span::styled(
                format!(" #{} ", self.hashtag),
                Style::new().cyan().bold().reversed(),
            )
        } else {
            Span::raw(format!("#{}", self.hashtag))
        }
    }

    /// Where pressing the pill leads. Unknown hashtags have no action.
    pub async fn press(&self, subscriptions: &dyn SubscriptionStore) -> Option<Route> {
        match navigation_for(self.hashtag, self.channels, subscriptions).await {
            Ok(Some(HashtagNavigation::OpenRoom(room))) => Some(Route::Room(room)),
            Ok(Some(HashtagNavigation::RoomInfo { room_type, room_id })) => {
                Some(Route::RoomInfo { room_type, room_id })
            }
            Ok(None) => None,
            Err(err) => {
                error!(hashtag = self.hashtag, "failed to resolve hashtag: {err}");
                None
            }
        }
    }
}

impl Widget for Hashtag<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Line::from(self.span()).render(area, buf);
    }
}

/// Render message text with its hashtags.
pub fn message_line(text: &str, channels: &[UserChannel]) -> Line<'static> {
    let spans: Vec<Span<'static>> = split_hashtags(text)
        .into_iter()
        .map(|segment| match segment {
            MessageSegment::Text(text) => Span::raw(text.to_string()),
            MessageSegment::Hashtag(name) => Hashtag::new(name, channels).span(),
        })
        .collect();
    Line::from(spans)
}

/// The last hashtag in `text` that names one of `channels`.
pub fn last_resolved_hashtag<'a>(text: &'a str, channels: &[UserChannel]) -> Option<&'a str> {
    split_hashtags(text)
        .into_iter()
        .rev()
        .find_map(|segment| match segment {
            MessageSegment::Hashtag(name) if resolve(name, channels).is_some() => Some(name),
            _ => None,
        })
}
