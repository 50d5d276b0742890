//! The video resource returned by the video, live-video and episode handlers.

use crate::livestream_api::Video;
use crate::resource::{Image, MediaSource, Meta, Resource, ResourceType, SourceType};
use crate::signing::sign_playback_url;
use crate::transforms::{Playback, TransformError, images::logo_images};

/// Maps a Livestream video (or an event's live entry) to a video resource with a signed HLS
/// source.
///
/// A video with its own `m3u8` is a VOD. One without is played from the event's master playlist
/// as a linear source that is broadcasting only while the event is live.
pub fn video_transform(video: &Video, playback: Playback<'_>) -> Result<Resource, TransformError> {
    Ok(Resource {
        id: format!("res-livestream-video-{}", video.id),
        kind: ResourceType::Video,
        title: first_of([&video.full_name, &video.short_name, &video.caption]),
        description: video.description.clone().unwrap_or_default(),
        images: video_images(video),
        sources: vec![playback_source(video, playback)?],
        duration: video.duration.map_or(0, |ms| ms.max(0.0).round() as u64),
        genres: Vec::new(),
        tags: video.tags.clone(),
        cast: Vec::new(),
        release_date: video.publish_at.clone().or_else(|| video.start_time.clone()),
        is_live: None,
        relationships: None,
        meta: Meta { max_age: 0 },
    })
}

fn playback_source(video: &Video, playback: Playback<'_>) -> Result<MediaSource, TransformError> {
    let source = match &video.m3u8 {
        Some(m3u8) => MediaSource::hls(m3u8.clone(), SourceType::Vod, false),
        None => {
            let event_id = video.event_id.as_deref().unwrap_or(&video.id);
            let master = playback
                .endpoint
                .master_playlist_url(&playback.credentials.account_id, event_id);
            MediaSource::hls(master, SourceType::Linear, video.is_live)
        }
    };
    let url = sign_playback_url(&source.url, playback.credentials, playback.signed_at).map_err(
        |_| TransformError {
            transform: "video_transform",
            field: "a usable signing key",
        },
    )?;
    Ok(MediaSource { url, ..source })
}

fn video_images(video: &Video) -> Vec<Image> {
    if let Some(logo) = &video.logo {
        return logo_images(logo);
    }

    [
        (&video.thumbnail_url, "thumbnail"),
        (&video.thumbnail_url_small, "thumbnail-small"),
    ]
    .into_iter()
    .filter_map(|(url, label)| {
        Some(Image {
            url: url.clone()?,
            width: Some(960),
            height: Some(540),
            label: label.to_owned(),
        })
    })
    .collect()
}

pub(crate) fn first_of<const N: usize>(candidates: [&Option<String>; N]) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::livestream_api::{Credentials, Endpoint};
    use crate::signing::playback_token;
    use jiff::Timestamp;
    use pretty_assertions::assert_eq;

    fn playback<'a>(endpoint: &'a Endpoint, credentials: &'a Credentials) -> Playback<'a> {
        Playback {
            endpoint,
            credentials,
            signed_at: Timestamp::from_millisecond(1_000).unwrap(),
        }
    }

    #[test]
    fn test_vod() {
        let endpoint = Endpoint::new("livestreamapis.com", 3);
        let credentials = Credentials::new("foo", "bar", Some("c".to_owned()));
        let video = Video {
            id: "11".to_owned(),
            event_id: Some("7".to_owned()),
            caption: Some("A caption".to_owned()),
            thumbnail_url: Some("https://x/t.jpg".to_owned()),
            m3u8: Some("https://x/11.m3u8".to_owned()),
            duration: Some(1234.4),
            publish_at: Some("2020-01-01T00:00:00Z".to_owned()),
            ..Default::default()
        };

        let resource = video_transform(&video, playback(&endpoint, &credentials)).unwrap();

        assert_eq!(resource.id, "res-livestream-video-11");
        assert_eq!(resource.title, "A caption");
        assert_eq!(resource.duration, 1234);
        assert_eq!(resource.release_date.as_deref(), Some("2020-01-01T00:00:00Z"));
        assert_eq!(resource.images.len(), 1);
        assert_eq!(resource.images[0].label, "thumbnail");

        let source = &resource.sources[0];
        assert_eq!(source.source_type, SourceType::Vod);
        assert!(!source.broadcasting);
        assert_eq!(
            source.url,
            format!(
                "https://x/11.m3u8?clientId=c&timestamp=1000&token={}",
                playback_token("foo", 1_000).unwrap()
            )
        );
    }

    #[test]
    fn test_live_entry_without_playlist_is_linear() {
        let endpoint = Endpoint::new("livestreamapis.com", 3);
        let credentials = Credentials::new("foo", "bar", Some("c".to_owned()));
        let video = Video {
            id: "7".to_owned(),
            full_name: Some("Live now".to_owned()),
            is_live: true,
            ..Default::default()
        };

        let resource = video_transform(&video, playback(&endpoint, &credentials)).unwrap();

        let source = &resource.sources[0];
        assert_eq!(source.source_type, SourceType::Linear);
        assert!(source.broadcasting);
        assert!(
            source
                .url
                .starts_with("https://livestreamapis.com/v3/accounts/bar/events/7/master.m3u8?"),
            "{}",
            source.url
        );
        assert_eq!(resource.title, "Live now");
    }

    #[test]
    fn test_first_of() {
        assert_eq!(
            first_of([&None, &Some(String::new()), &Some("b".to_owned())]),
            "b"
        );
        assert_eq!(first_of([&None, &None]), "");
    }
}
