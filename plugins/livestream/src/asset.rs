//! Direct asset lookups, outside the catalog handler pipeline.
//!
//! A caller names the kind of asset by sub-provider string (`vod` or `live-video`) and passes the
//! identifiers it needs as JSON arguments. The result bundles the transformed resource with the
//! raw payload it was built from.

use crate::livestream_api::types::optional_id;
use crate::livestream_api::{AccountClient, ApiError, Event, MissingCredential, Video};
use crate::resource::Resource;
use crate::transforms::{TransformError, event_to_live_video, vod_to_video};
use serde::{Deserialize, Serialize};
use tracing::instrument;

pub const PROVIDER_NAME: &str = "livestream";

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("No Livestream Provider method for subProvider \"{0}\"")]
    Unsupported(String),

    #[error("invalid arguments for subProvider \"{sub_provider}\": {reason}")]
    InvalidArgs {
        sub_provider: &'static str,
        reason: String,
    },

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Credentials(#[from] MissingCredential),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// The identifiers an asset is addressed by. Also echoed back in [`Asset::args`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetArgs {
    #[serde(default, deserialize_with = "optional_id", skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, deserialize_with = "optional_id", skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRequest {
    Vod { event_id: String, video_id: String },
    LiveVideo { event_id: String },
}

impl AssetRequest {
    /// Builds a request from a sub-provider name and its JSON arguments.
    pub fn parse(sub_provider: &str, args: &serde_json::Value) -> Result<Self, AssetError> {
        let (name, needs_video) = match sub_provider {
            "vod" => ("vod", true),
            "live-video" => ("live-video", false),
            other => return Err(AssetError::Unsupported(other.to_owned())),
        };

        let invalid = |reason: String| AssetError::InvalidArgs {
            sub_provider: name,
            reason,
        };
        let args = AssetArgs::deserialize(args).map_err(|e| invalid(e.to_string()))?;
        let event_id = args
            .event_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| invalid("missing required \"eventId\"".to_owned()))?;

        if !needs_video {
            return Ok(AssetRequest::LiveVideo { event_id });
        }
        let video_id = args
            .video_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| invalid("missing required \"videoId\"".to_owned()))?;
        Ok(AssetRequest::Vod { event_id, video_id })
    }

    pub fn sub_provider(&self) -> &'static str {
        match self {
            AssetRequest::Vod { .. } => "vod",
            AssetRequest::LiveVideo { .. } => "live-video",
        }
    }
}

/// The raw payload an asset was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AssetSource {
    Video(Video),
    Event(Event),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub data: Resource,
    pub provider: &'static str,
    pub sub_provider: &'static str,
    pub args: AssetArgs,
    pub source: AssetSource,
}

/// Resolves one asset for an account.
#[instrument(skip(account), fields(account_id = %account.credentials().account_id))]
pub async fn get_asset(account: &AccountClient, request: AssetRequest) -> Result<Asset, AssetError> {
    let sub_provider = request.sub_provider();
    match request {
        AssetRequest::Vod { event_id, video_id } => {
            let video = account
                .get_video(&event_id, &video_id)
                .await?
                .ok_or_else(|| {
                    AssetError::NotFound(format!(
                        "Video not found for event id \"{event_id}\" video id \"{video_id}\""
                    ))
                })?;
            let data = vod_to_video(&video)?;
            Ok(Asset {
                data,
                provider: PROVIDER_NAME,
                sub_provider,
                args: AssetArgs {
                    event_id: video.event_id.clone(),
                    video_id: Some(video.id.clone()),
                },
                source: AssetSource::Video(video),
            })
        }
        AssetRequest::LiveVideo { event_id } => {
            let event = account.get_event(&event_id).await?.ok_or_else(|| {
                AssetError::NotFound(format!(
                    "Event \"{event_id}\" does not exist to fetch live video"
                ))
            })?;
            let data = event_to_live_video(&event, account.endpoint())?;
            Ok(Asset {
                data,
                provider: PROVIDER_NAME,
                sub_provider,
                args: AssetArgs {
                    event_id: Some(event.id.clone()),
                    video_id: None,
                },
                source: AssetSource::Event(event),
            })
        }
    }
}
