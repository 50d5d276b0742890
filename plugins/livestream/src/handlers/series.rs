//! `livestream-series`: an event whose tagged videos form a series.

use crate::bus::{HostBus, ItemSpec};
use crate::handlers::compose::{
    SeriesChildren, partition_series, register_children, season_spec, video_spec,
};
use crate::handlers::{HandlerError, Handlers, Missing};
use crate::livestream_api::{AccountClient, Event, EventVideoListing};
use crate::resource::{Relationships, Resource, ResourceType};
use crate::transforms::collection_transform;

/// Fetches the event and walks its feed, failing if either is missing.
pub(crate) async fn fetch_event_and_videos(
    account: &AccountClient,
    event_id: &str,
) -> Result<(Event, EventVideoListing), HandlerError> {
    let event = account.get_event(event_id).await?.ok_or_else(|| {
        HandlerError::not_found(
            Missing::Collection,
            format!("Collection not found for event id \"{event_id}\""),
        )
    })?;
    let listing = account.get_all_event_vods(event_id).await?.ok_or_else(|| {
        HandlerError::not_found(
            Missing::Videos,
            format!("Videos not found for event id \"{event_id}\""),
        )
    })?;
    Ok((event, listing))
}

pub(crate) async fn fetch_series<B: HostBus>(
    handlers: &Handlers<B>,
    account: &AccountClient,
    spec: &ItemSpec,
    event_id: &str,
) -> Result<Option<Resource>, HandlerError> {
    let (event, listing) = fetch_event_and_videos(account, event_id).await?;

    let links = match partition_series(&listing.vods) {
        SeriesChildren::Seasons(seasons) => {
            tracing::debug!(seasons = seasons.len(), "series has seasons");
            let children = seasons
                .iter()
                .map(|season| season_spec(spec, event_id, season))
                .collect();
            register_children(handlers.bus(), children, ResourceType::Collection).await?
        }
        SeriesChildren::Episodes(episodes) => {
            tracing::debug!(episodes = episodes.len(), "series has no seasons");
            let children = episodes
                .iter()
                .map(|tagged| video_spec(spec, event_id, tagged))
                .collect();
            register_children(handlers.bus(), children, ResourceType::Video).await?
        }
    };

    Ok(Some(collection_transform(
        spec,
        &event,
        ResourceType::Series,
        Relationships::entities(links),
    )))
}
