//! `livestream-video`: a single VOD, or an event's live stream when the spec names no video.

use crate::bus::{HostBus, ItemSpec};
use crate::handlers::{HandlerError, Handlers, Missing, playback};
use crate::livestream_api::AccountClient;
use crate::resource::Resource;
use crate::transforms::video_transform;

pub(crate) async fn fetch_video<B: HostBus>(
    handlers: &Handlers<B>,
    account: &AccountClient,
    spec: &ItemSpec,
    event_id: &str,
) -> Result<Option<Resource>, HandlerError> {
    match spec.video_id() {
        Some(video_id) => fetch_vod(account, event_id, video_id).await.map(Some),
        None => fetch_live(handlers, account, spec, event_id).await,
    }
}

async fn fetch_vod(
    account: &AccountClient,
    event_id: &str,
    video_id: &str,
) -> Result<Resource, HandlerError> {
    let mut video = account.get_video(event_id, video_id).await?.ok_or_else(|| {
        HandlerError::not_found(
            Missing::Video,
            format!("Video not found for event id \"{event_id}\" video id \"{video_id}\""),
        )
    })?;
    video.event_id.get_or_insert_with(|| event_id.to_owned());
    Ok(video_transform(&video, playback(account))?)
}

async fn fetch_live<B: HostBus>(
    handlers: &Handlers<B>,
    account: &AccountClient,
    spec: &ItemSpec,
    event_id: &str,
) -> Result<Option<Resource>, HandlerError> {
    let page = account
        .get_event_videos(event_id, None)
        .await?
        .ok_or_else(|| {
            HandlerError::not_found(
                Missing::Video,
                format!("Live video not found for event id \"{event_id}\""),
            )
        })?;

    let Some(mut live) = page.live else {
        let message = format!(
            "No Livestream live stream for event {event_id} in channel {}",
            spec.channel
        );
        tracing::warn!("{message}");
        handlers.warn(Missing::Video.code(), message, spec).await;
        return Ok(None);
    };

    live.event_id.get_or_insert_with(|| event_id.to_owned());
    Ok(Some(video_transform(&live, playback(account))?))
}
