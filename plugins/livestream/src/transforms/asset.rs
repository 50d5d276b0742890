//! Transforms used when resolving a single asset directly, outside the handler pipeline.

use crate::livestream_api::{Endpoint, Event, Video};
use crate::resource::{MediaSource, Meta, Resource, ResourceType, SourceType};
use crate::transforms::{TransformError, images::compose_images};

/// A posted VOD as a playable video. Requires the video's event id and playlist.
pub fn vod_to_video(video: &Video) -> Result<Resource, TransformError> {
    let missing = |field| TransformError {
        transform: "vod_to_video",
        field,
    };
    let event_id = video.event_id.as_deref().ok_or(missing("an event id"))?;
    let m3u8 = video.m3u8.as_deref().ok_or(missing("an m3u8 playlist"))?;

    let images = video
        .thumbnail_url
        .as_deref()
        .or(video.thumbnail_url_small.as_deref())
        .map(compose_images)
        .unwrap_or_default();
    let caption = video.caption.clone().filter(|c| !c.is_empty());

    Ok(Resource {
        id: format!("event-{event_id}-vod-{}", video.id),
        kind: ResourceType::Video,
        title: caption.clone().unwrap_or_else(|| "Untitled Video".to_owned()),
        description: video
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .or(caption)
            .unwrap_or_else(|| "Video on demand.".to_owned()),
        images,
        sources: vec![MediaSource::hls(m3u8, SourceType::Vod, true).labeled("hls")],
        duration: video.duration.map_or(0, |ms| ms.max(0.0).round() as u64),
        genres: Vec::new(),
        tags: video.tags.clone(),
        cast: Vec::new(),
        release_date: video.publish_at.clone().or_else(|| video.created_at.clone()),
        is_live: Some(true),
        relationships: None,
        meta: Meta::default(),
    })
}

/// An event's live stream as a playable video. Requires the event's owning account.
pub fn event_to_live_video(event: &Event, endpoint: &Endpoint) -> Result<Resource, TransformError> {
    let account_id = event.owner_account_id.as_deref().ok_or(TransformError {
        transform: "event_to_live_video",
        field: "an owner account id",
    })?;

    let images = event
        .logo
        .as_ref()
        .and_then(|logo| logo.url.as_deref())
        .map(compose_images)
        .unwrap_or_default();
    let master = endpoint.master_playlist_url(account_id, &event.id);

    Ok(Resource {
        id: format!("event-{}-live", event.id),
        kind: ResourceType::Video,
        title: [&event.full_name, &event.short_name]
            .into_iter()
            .flatten()
            .find(|t| !t.is_empty())
            .cloned()
            .unwrap_or_else(|| "Untitled Live Stream".to_owned()),
        description: event
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "Live video.".to_owned()),
        images,
        sources: vec![MediaSource::hls(master, SourceType::Linear, event.is_live).labeled("hls")],
        duration: 0,
        genres: Vec::new(),
        tags: event.tags.clone(),
        cast: Vec::new(),
        release_date: event.start_time.clone().or_else(|| event.created_at.clone()),
        is_live: Some(event.is_live),
        relationships: None,
        meta: Meta::default(),
    })
}
