//! Season/episode grouping and child spec registration.
//!
//! Livestream has no notion of series. A series is modeled as one event whose videos are tagged
//! `S-<n>` (season) and `E-<n>` (episode); tags are normalized to zero-padded keys such as
//! `s-001` so they sort correctly as strings.

use crate::bus::{HostBus, IdRef, ItemSpec, SpecType};
use crate::handlers::{HandlerError, HandlerKind};
use crate::livestream_api::Video;
use crate::resource::{ResourceLink, ResourceType};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

pub static SEASON_TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[sS]-\d+").expect("season tag pattern is valid"));

pub static EPISODE_TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[eE]-\d+").expect("episode tag pattern is valid"));

/// `S-1` becomes `s-001`. Numbers wider than three digits are kept as-is.
pub fn tag_to_key(tag: &str) -> String {
    let tag = tag.trim().to_lowercase();
    match tag.split_once('-') {
        Some((prefix, number)) => format!("{prefix}-{number:0>3}"),
        None => tag,
    }
}

/// Normalizes a season given in a spec, which may or may not already be a key.
pub fn season_key(season: &str) -> String {
    if SEASON_TAG_PATTERN.is_match(season) {
        tag_to_key(season)
    } else {
        season.to_owned()
    }
}

/// A video with its season and episode keys, if tagged.
#[derive(Debug, Clone, Copy)]
pub struct TaggedVideo<'a> {
    pub video: &'a Video,
    pub season: Option<&'a str>,
    pub episode: Option<&'a str>,
}

impl<'a> TaggedVideo<'a> {
    fn keys(&self) -> (Option<String>, Option<String>) {
        (self.season.map(tag_to_key), self.episode.map(tag_to_key))
    }
}

/// Reads season and episode tags off a video. When several tags match, the last one wins.
pub fn tag_video(video: &Video) -> TaggedVideo<'_> {
    let mut tagged = TaggedVideo {
        video,
        season: None,
        episode: None,
    };
    for tag in &video.tags {
        if SEASON_TAG_PATTERN.is_match(tag) {
            tagged.season = Some(tag.as_str());
        }
        if EPISODE_TAG_PATTERN.is_match(tag) {
            tagged.episode = Some(tag.as_str());
        }
    }
    tagged
}

/// How a series presents its children.
#[derive(Debug)]
pub enum SeriesChildren<'a> {
    /// Season keys, ascending.
    Seasons(Vec<String>),
    /// Episodes, ascending by episode key, for series without season tags.
    Episodes(Vec<TaggedVideo<'a>>),
}

/// Groups the episode-tagged videos of a series.
///
/// Untagged videos (trailers, extras) are not part of the series.
pub fn partition_series(videos: &[Video]) -> SeriesChildren<'_> {
    let episodes: Vec<_> = videos
        .iter()
        .map(tag_video)
        .filter(|tagged| tagged.episode.is_some())
        .collect();

    let seasons: BTreeSet<String> = episodes
        .iter()
        .filter_map(|tagged| tagged.season.map(tag_to_key))
        .collect();

    if seasons.is_empty() {
        SeriesChildren::Episodes(sort_episodes(episodes))
    } else {
        SeriesChildren::Seasons(seasons.into_iter().collect())
    }
}

/// The episodes of one season, ascending by episode key.
pub fn season_episodes<'a>(videos: &'a [Video], season: &str) -> Vec<TaggedVideo<'a>> {
    let episodes = videos
        .iter()
        .map(tag_video)
        .filter(|tagged| tagged.season.map(tag_to_key).as_deref() == Some(season))
        .collect();
    sort_episodes(episodes)
}

fn sort_episodes(mut episodes: Vec<TaggedVideo<'_>>) -> Vec<TaggedVideo<'_>> {
    episodes.sort_by_cached_key(|tagged| tagged.episode.map(tag_to_key));
    episodes
}

/// The spec for one video of an event.
pub fn video_spec(parent: &ItemSpec, event_id: &str, tagged: &TaggedVideo<'_>) -> ItemSpec {
    let (season, episode) = tagged.keys();
    ItemSpec {
        id: format!(
            "spec-livestream-video-{}-{event_id}-{}",
            parent.channel, tagged.video.id
        ),
        channel: parent.channel.clone(),
        kind: SpecType::VideoSpec,
        source: HandlerKind::Video.source().to_owned(),
        event: Some(IdRef::new(event_id)),
        video: Some(IdRef::new(tagged.video.id.clone())),
        season,
        episode,
        images: Vec::new(),
    }
}

/// The spec for one season of a series.
pub fn season_spec(parent: &ItemSpec, event_id: &str, season: &str) -> ItemSpec {
    ItemSpec {
        id: format!(
            "spec-livestream-season-{}-{event_id}-{season}",
            parent.channel
        ),
        channel: parent.channel.clone(),
        kind: SpecType::CollectionSpec,
        source: HandlerKind::Season.source().to_owned(),
        event: Some(IdRef::new(event_id)),
        video: None,
        season: Some(season.to_owned()),
        episode: None,
        images: Vec::new(),
    }
}

/// Registers each child spec with the host, in order, and links the resource ids it assigns.
pub async fn register_children<B: HostBus>(
    bus: &B,
    children: Vec<ItemSpec>,
    kind: ResourceType,
) -> Result<Vec<ResourceLink>, HandlerError> {
    let mut links = Vec::with_capacity(children.len());
    for child in children {
        let child_id = child.id.clone();
        let id = bus
            .set_item_spec(child)
            .await
            .map_err(|e| HandlerError::Bus(e.wrap_err(format!("register spec '{child_id}'"))))?;
        tracing::trace!(spec_id = %child_id, resource_id = %id, "registered child spec");
        links.push(ResourceLink { id, kind });
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBus;
    use pretty_assertions::assert_eq;

    fn video(id: &str, tags: &[&str]) -> Video {
        Video {
            id: id.to_owned(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    fn parent() -> ItemSpec {
        ItemSpec {
            id: "spec-livestream-series-abc-7".to_owned(),
            channel: "abc".to_owned(),
            kind: SpecType::CollectionSpec,
            source: HandlerKind::Series.source().to_owned(),
            event: Some(IdRef::new("7")),
            video: None,
            season: None,
            episode: None,
            images: Vec::new(),
        }
    }

    #[test]
    fn test_tag_to_key() {
        assert_eq!(tag_to_key("S-1"), "s-001");
        assert_eq!(tag_to_key("e-12"), "e-012");
        assert_eq!(tag_to_key("E-123"), "e-123");
        assert_eq!(tag_to_key("s-1234"), "s-1234");
    }

    #[test]
    fn test_patterns() {
        assert!(SEASON_TAG_PATTERN.is_match("S-1"));
        assert!(SEASON_TAG_PATTERN.is_match("s-10"));
        assert!(!SEASON_TAG_PATTERN.is_match("season-1"));
        assert!(EPISODE_TAG_PATTERN.is_match("e-3"));
        assert!(!EPISODE_TAG_PATTERN.is_match("x-e-3"));
    }

    #[test]
    fn test_series_groups_seasons() {
        let videos = vec![
            video("a", &["s-1", "e-3"]),
            video("b", &["s-1", "e-1"]),
            video("c", &["s-2", "e-1"]),
            video("trailer", &["s-3"]),
        ];

        let SeriesChildren::Seasons(seasons) = partition_series(&videos) else {
            panic!("expected seasons");
        };
        assert_eq!(seasons, vec!["s-001", "s-002"]);

        let episodes: Vec<_> = season_episodes(&videos, "s-001")
            .iter()
            .map(|t| t.video.id.as_str())
            .collect();
        assert_eq!(episodes, vec!["b", "a"]);
    }

    #[test]
    fn test_series_without_seasons_lists_episodes() {
        let videos = vec![
            video("ten", &["E-10"]),
            video("two", &["E-2"]),
            video("extra", &["bonus"]),
        ];

        let SeriesChildren::Episodes(episodes) = partition_series(&videos) else {
            panic!("expected episodes");
        };
        let ids: Vec<_> = episodes.iter().map(|t| t.video.id.as_str()).collect();
        assert_eq!(ids, vec!["two", "ten"]);
    }

    #[test]
    fn test_child_specs() {
        let v = video("42", &["S-1", "E-2"]);
        let spec = video_spec(&parent(), "7", &tag_video(&v));
        assert_eq!(spec.id, "spec-livestream-video-abc-7-42");
        assert_eq!(spec.source, "livestream-video");
        assert_eq!(spec.kind, SpecType::VideoSpec);
        assert_eq!(spec.video_id(), Some("42"));
        assert_eq!(spec.season.as_deref(), Some("s-001"));
        assert_eq!(spec.episode.as_deref(), Some("e-002"));

        let spec = season_spec(&parent(), "7", "s-001");
        assert_eq!(spec.id, "spec-livestream-season-abc-7-s-001");
        assert_eq!(spec.source, "livestream-season");
        assert_eq!(spec.kind, SpecType::CollectionSpec);
        assert_eq!(spec.season_key(), Some("s-001"));
    }

    #[test]
    fn test_season_key() {
        assert_eq!(season_key("S-2"), "s-002");
        assert_eq!(season_key("s-002"), "s-002");
        assert_eq!(season_key("specials"), "specials");
    }

    #[tokio::test]
    async fn test_register_children_in_order() {
        let bus = MockBus::new();
        let children = vec![
            season_spec(&parent(), "7", "s-001"),
            season_spec(&parent(), "7", "s-002"),
        ];

        let links = register_children(&bus, children, ResourceType::Collection)
            .await
            .unwrap();

        assert_eq!(
            links.iter().map(|l| l.id.as_str()).collect::<Vec<_>>(),
            vec![
                "res-livestream-season-abc-7-s-001",
                "res-livestream-season-abc-7-s-002"
            ]
        );
        assert_eq!(bus.registered_specs().await.len(), 2);
    }

    #[tokio::test]
    async fn test_register_children_failure() {
        let bus = MockBus::new().failing_registration();
        let result = register_children(
            &bus,
            vec![season_spec(&parent(), "7", "s-001")],
            ResourceType::Collection,
        )
        .await;
        assert!(matches!(result, Err(HandlerError::Bus(_))), "{result:?}");
    }
}
