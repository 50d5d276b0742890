//! Livestream video payloads and the event video feed.

use crate::livestream_api::events::Event;
use crate::livestream_api::types::{
    Logo, id_from_number_or_string, id_of, optional_id, tags_from_list_or_csv,
};
use serde::{Deserialize, Serialize};

/// A single video, either a VOD posted to an event or the event's live entry.
///
/// See: <https://livestream.com/developers/docs/api/#video-object>
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    #[serde(default, deserialize_with = "optional_id")]
    pub event_id: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url_small: Option<String>,
    #[serde(default)]
    pub logo: Option<Logo>,
    /// HLS playlist for a VOD. Absent on live entries.
    #[serde(default)]
    pub m3u8: Option<String>,
    /// Milliseconds.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub publish_at: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "tags_from_list_or_csv")]
    pub tags: Vec<String>,
}

impl Video {
    /// Views an event as its live video entry.
    pub fn from_live_event(event: &Event) -> Self {
        Self {
            id: event.id.clone(),
            event_id: Some(event.id.clone()),
            full_name: event.full_name.clone(),
            short_name: event.short_name.clone(),
            description: event.description.clone(),
            logo: event.logo.clone(),
            is_live: event.is_live,
            draft: event.draft,
            start_time: event.start_time.clone(),
            created_at: event.created_at.clone(),
            tags: event.tags.clone(),
            ..Default::default()
        }
    }
}

/// Response of `GET /accounts/{account}/events/{event}/videos`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventVideosResponse {
    /// The event's live entry, whether or not it is currently broadcasting.
    #[serde(default)]
    pub live: Option<Video>,
    #[serde(default)]
    pub vods: Option<FeedPage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub data: Vec<FeedItem>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// One entry in an event feed. Feeds interleave videos with posts and images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl FeedItem {
    pub const VIDEO: &'static str = "video";

    pub fn id(&self) -> Option<String> {
        id_of(&self.data)
    }

    pub fn is_video(&self) -> bool {
        self.kind == Self::VIDEO
    }

    pub fn into_video(self) -> Result<Video, serde_json::Error> {
        serde_json::from_value(self.data)
    }
}
