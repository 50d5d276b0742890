//! Pure mappings from Livestream payloads to catalog resources.

pub mod asset;
pub mod collection;
pub mod images;
pub mod video;

use crate::livestream_api::{Credentials, Endpoint};
use jiff::Timestamp;

pub use asset::{event_to_live_video, vod_to_video};
pub use collection::collection_transform;
pub use images::{compose_images, logo_images};
pub use video::video_transform;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{transform} requires {field}")]
pub struct TransformError {
    pub transform: &'static str,
    pub field: &'static str,
}

/// What a transform needs to produce signed playback URLs.
#[derive(Debug, Clone, Copy)]
pub struct Playback<'a> {
    pub endpoint: &'a Endpoint,
    pub credentials: &'a Credentials,
    pub signed_at: Timestamp,
}

/// `spec-...` becomes `res-...`.
pub(crate) fn resource_id_for_spec(spec_id: &str) -> String {
    match spec_id.strip_prefix("spec") {
        Some(rest) => format!("res{rest}"),
        None => spec_id.to_owned(),
    }
}
