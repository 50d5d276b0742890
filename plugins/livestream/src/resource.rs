//! Canonical resource shapes handed back to the host catalog.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Collection,
    Video,
    Series,
    Season,
}

/// A normalized catalog entity.
///
/// Resources are built once by a transform and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub title: String,
    pub description: String,
    pub images: Vec<Image>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<MediaSource>,
    /// Milliseconds.
    pub duration: u64,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub cast: Vec<String>,
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_live: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Relationships>,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// A finished recording.
    Vod,
    /// A live, continuously-updated playlist.
    Linear,
}

/// One playable rendition of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSource {
    pub url: String,
    pub container: String,
    pub mime_type: String,
    pub source_type: SourceType,
    pub broadcasting: bool,
    pub height: Option<u32>,
    pub width: Option<u32>,
    pub max_bitrate: u64,
    pub label: String,
}

impl MediaSource {
    pub const HLS_MIME_TYPE: &'static str = "application/x-mpegURL";

    pub fn hls(url: impl Into<String>, source_type: SourceType, broadcasting: bool) -> Self {
        Self {
            url: url.into(),
            container: "hls".to_owned(),
            mime_type: Self::HLS_MIME_TYPE.to_owned(),
            source_type,
            broadcasting,
            height: None,
            width: None,
            max_bitrate: 0,
            label: String::new(),
        }
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Relationships {
    pub entities: RelationshipData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationshipData {
    pub data: Vec<ResourceLink>,
}

/// A pointer from a composite resource to a child the host has registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceLink {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
}

impl Relationships {
    pub fn entities(links: Vec<ResourceLink>) -> Self {
        Self {
            entities: RelationshipData { data: links },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// How long, in seconds, the host may cache this resource.
    pub max_age: u64,
}
