//! `livestream-live-video`: an event's live stream, built from the event itself.

use crate::handlers::{HandlerError, Missing, playback};
use crate::livestream_api::{AccountClient, Video};
use crate::resource::Resource;
use crate::transforms::video_transform;

pub(crate) async fn fetch_live_video(
    account: &AccountClient,
    event_id: &str,
) -> Result<Option<Resource>, HandlerError> {
    let event = account.get_event(event_id).await?.ok_or_else(|| {
        HandlerError::not_found(
            Missing::Event,
            format!("Event \"{event_id}\" does not exist to fetch live video"),
        )
    })?;

    let live = Video::from_live_event(&event);
    Ok(Some(video_transform(&live, playback(account))?))
}
