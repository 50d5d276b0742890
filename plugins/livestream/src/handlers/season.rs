//! `livestream-season`: one season of a series, linking its episodes in order.

use crate::bus::{HostBus, ItemSpec};
use crate::handlers::compose::{register_children, season_episodes, season_key, video_spec};
use crate::handlers::series::fetch_event_and_videos;
use crate::handlers::{HandlerError, Handlers};
use crate::livestream_api::AccountClient;
use crate::resource::{Relationships, Resource, ResourceType};
use crate::transforms::collection_transform;

pub(crate) async fn fetch_season<B: HostBus>(
    handlers: &Handlers<B>,
    account: &AccountClient,
    spec: &ItemSpec,
    event_id: &str,
) -> Result<Option<Resource>, HandlerError> {
    let season = spec.season_key().map(season_key).ok_or_else(|| {
        HandlerError::InvalidSpec(format!(
            "Livestream fetchSeason requires a season. channel: {}",
            spec.channel
        ))
    })?;

    let (event, listing) = fetch_event_and_videos(account, event_id).await?;

    let children = season_episodes(&listing.vods, &season)
        .iter()
        .map(|tagged| video_spec(spec, event_id, tagged))
        .collect();
    let links = register_children(handlers.bus(), children, ResourceType::Video).await?;
    tracing::debug!(%season, episodes = links.len(), "registered season episodes");

    Ok(Some(collection_transform(
        spec,
        &event,
        ResourceType::Season,
        Relationships::entities(links),
    )))
}
