//! `livestream-collection`: an event as a collection of its videos.

use crate::bus::{HostBus, ItemSpec};
use crate::handlers::compose::{register_children, tag_video, video_spec};
use crate::handlers::{HandlerError, Handlers, Missing};
use crate::livestream_api::AccountClient;
use crate::resource::{Relationships, Resource, ResourceType};
use crate::transforms::collection_transform;

pub(crate) async fn fetch_collection<B: HostBus>(
    handlers: &Handlers<B>,
    account: &AccountClient,
    spec: &ItemSpec,
    event_id: &str,
) -> Result<Option<Resource>, HandlerError> {
    let event = account.get_event(event_id).await?.ok_or_else(|| {
        HandlerError::not_found(
            Missing::Collection,
            format!("Collection not found for event id \"{event_id}\""),
        )
    })?;

    // the event exists, so a missing feed just means nothing has been posted yet
    let listing = account
        .get_all_event_vods(event_id)
        .await?
        .unwrap_or_default();

    let children = listing
        .live
        .iter()
        .chain(listing.vods.iter())
        .map(|video| video_spec(spec, event_id, &tag_video(video)))
        .collect();
    let links = register_children(handlers.bus(), children, ResourceType::Video).await?;
    tracing::debug!(videos = links.len(), "registered collection videos");

    Ok(Some(collection_transform(
        spec,
        &event,
        ResourceType::Collection,
        Relationships::entities(links),
    )))
}
