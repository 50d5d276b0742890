//! Fetch handlers the host dispatches catalog requests to.
//!
//! Every handler runs the same outer pipeline: resolve the channel's credentials (soft-skipping
//! when there are none), check the spec carries the identifiers it needs, then hand off to the
//! per-kind fetch. Failures are reported twice, as a returned error and as a host-visible
//! diagnostic event, except rate limiting, which resolves to nothing with a warning.

pub mod collection;
pub mod compose;
pub mod live_video;
pub mod season;
pub mod series;
pub mod video;

use crate::bus::{DiagnosticEvent, HostBus, ItemSpec, Level};
use crate::channel_cache::ChannelCache;
use crate::livestream_api::{AccountClient, ApiError, LivestreamClient};
use crate::resource::Resource;
use crate::transforms::{Playback, TransformError};
use jiff::Timestamp;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// The kinds of fetch this provider answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Collection,
    Video,
    LiveVideo,
    Series,
    Season,
}

impl HandlerKind {
    pub const ALL: [HandlerKind; 5] = [
        HandlerKind::Collection,
        HandlerKind::Video,
        HandlerKind::LiveVideo,
        HandlerKind::Series,
        HandlerKind::Season,
    ];

    /// The `source` a spec carries when it should be fetched by this handler.
    pub fn source(self) -> &'static str {
        match self {
            HandlerKind::Collection => "livestream-collection",
            HandlerKind::Video => "livestream-video",
            HandlerKind::LiveVideo => "livestream-live-video",
            HandlerKind::Series => "livestream-series",
            HandlerKind::Season => "livestream-season",
        }
    }

    pub fn from_source(source: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.source() == source)
    }

    fn name(self) -> &'static str {
        match self {
            HandlerKind::Collection => "fetchCollection",
            HandlerKind::Video => "fetchVideo",
            HandlerKind::LiveVideo => "fetchLiveVideo",
            HandlerKind::Series => "fetchSeries",
            HandlerKind::Season => "fetchSeason",
        }
    }
}

/// Which missing thing a [`HandlerError::NotFound`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Collection,
    Video,
    Event,
    Videos,
}

impl Missing {
    pub fn code(self) -> &'static str {
        match self {
            Missing::Collection => "COLLECTION_NOT_FOUND",
            Missing::Video => "VIDEO_NOT_FOUND",
            Missing::Event => "EVENT_NOT_FOUND",
            Missing::Videos => "VIDEOS_NOT_FOUND",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("{0}")]
    InvalidSpec(String),

    #[error("{message}")]
    NotFound { missing: Missing, message: String },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("host bus request failed: {0:#}")]
    Bus(eyre::Report),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("no Livestream handler for source '{0}'")]
    UnsupportedSource(String),
}

impl HandlerError {
    pub(crate) fn not_found(missing: Missing, message: impl Into<String>) -> Self {
        HandlerError::NotFound {
            missing,
            message: message.into(),
        }
    }

    /// A stable, machine-readable code for this error, as sent in diagnostic events.
    pub fn code(&self) -> &'static str {
        match self {
            HandlerError::InvalidSpec(_) => "INVALID_SPEC",
            HandlerError::NotFound { missing, .. } => missing.code(),
            HandlerError::Api(e) if e.is_rate_limited() => ApiError::RATE_LIMITED,
            HandlerError::Api(_) => "API_ERROR",
            HandlerError::Bus(_) => "BUS_ERROR",
            HandlerError::Transform(_) => "TRANSFORM_ERROR",
            HandlerError::UnsupportedSource(_) => "UNSUPPORTED_SOURCE",
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, HandlerError::Api(e) if e.is_rate_limited())
    }
}

/// Shared state for all handlers.
#[derive(Debug)]
pub struct Handlers<B> {
    bus: Arc<B>,
    channels: ChannelCache<B>,
    client: LivestreamClient,
}

impl<B: HostBus> Handlers<B> {
    pub fn new(bus: Arc<B>, client: LivestreamClient, channel_cache_ttl: Duration) -> Self {
        Self {
            channels: ChannelCache::new(Arc::clone(&bus), channel_cache_ttl),
            bus,
            client,
        }
    }

    pub fn client(&self) -> &LivestreamClient {
        &self.client
    }

    pub(crate) fn bus(&self) -> &B {
        &self.bus
    }

    /// Runs one fetch of the given kind.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(_))` - the fetched resource
    /// * `Ok(None)` - nothing to return: the channel has no credentials, the event has no live
    ///   stream, or the request was rate limited; a warning has been broadcast
    /// * `Err(_)` - the fetch failed; an error event carrying the spec has been broadcast
    #[instrument(skip(self, spec), fields(spec_id = %spec.id, channel = %spec.channel))]
    pub async fn handle(
        &self,
        kind: HandlerKind,
        spec: &ItemSpec,
    ) -> Result<Option<Resource>, HandlerError> {
        match self.run(kind, spec).await {
            Ok(resource) => Ok(resource),
            Err(e) if e.is_rate_limited() => {
                tracing::warn!(error = %e, "rate limited by Livestream, skipping");
                self.warn(ApiError::RATE_LIMITED, e.to_string(), spec).await;
                Ok(None)
            }
            Err(e) => {
                tracing::error!(error = %e, code = e.code(), "{} failed", kind.name());
                self.bus
                    .broadcast(
                        Level::Error,
                        DiagnosticEvent {
                            code: Some(e.code().to_owned()),
                            message: e.to_string(),
                            spec: Some(spec.clone()),
                        },
                    )
                    .await;
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        kind: HandlerKind,
        spec: &ItemSpec,
    ) -> Result<Option<Resource>, HandlerError> {
        let Some(account) = self.account_for(kind, spec).await? else {
            return Ok(None);
        };

        let event_id = spec.event_id().ok_or_else(|| {
            HandlerError::InvalidSpec(format!(
                "Livestream {} requires an event ID. channel: {}",
                kind.name(),
                spec.channel
            ))
        })?;

        match kind {
            HandlerKind::Collection => {
                collection::fetch_collection(self, &account, spec, event_id).await
            }
            HandlerKind::Video => video::fetch_video(self, &account, spec, event_id).await,
            HandlerKind::LiveVideo => live_video::fetch_live_video(&account, event_id).await,
            HandlerKind::Series => series::fetch_series(self, &account, spec, event_id).await,
            HandlerKind::Season => season::fetch_season(self, &account, spec, event_id).await,
        }
    }

    /// The account client for the spec's channel, or `None` (with a warning) if the channel has
    /// no usable Livestream credentials.
    async fn account_for(
        &self,
        kind: HandlerKind,
        spec: &ItemSpec,
    ) -> Result<Option<AccountClient>, HandlerError> {
        let channel = self
            .channels
            .get(&spec.channel)
            .await
            .map_err(HandlerError::Bus)?;

        let account = channel
            .as_ref()
            .and_then(|channel| channel.livestream_credentials())
            .and_then(|credentials| self.client.account(credentials).ok());

        if account.is_none() {
            let message = format!(
                "Skipping Livestream {} due to missing credentials in channel {}",
                kind.name(),
                spec.channel
            );
            tracing::warn!("{message}");
            self.bus
                .broadcast(
                    Level::Warn,
                    DiagnosticEvent {
                        code: None,
                        message,
                        spec: None,
                    },
                )
                .await;
        }
        Ok(account)
    }

    pub(crate) async fn warn(&self, code: &str, message: String, spec: &ItemSpec) {
        self.bus
            .broadcast(
                Level::Warn,
                DiagnosticEvent {
                    code: Some(code.to_owned()),
                    message,
                    spec: Some(spec.clone()),
                },
            )
            .await;
    }
}

/// Signing inputs for one account, timestamped now.
pub(crate) fn playback(account: &AccountClient) -> Playback<'_> {
    Playback {
        endpoint: account.endpoint(),
        credentials: account.credentials(),
        signed_at: Timestamp::now(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::bus::{Channel, ChannelSecrets, IdRef, ItemSpec, LivestreamSecrets, SpecType};
    use crate::config::ProviderConfig;
    use crate::handlers::{HandlerKind, Handlers};
    use crate::livestream_api::LivestreamClient;
    use crate::mock::{MockBus, ScriptedTransport};
    use std::sync::Arc;
    use std::time::Duration;

    pub const CHANNEL: &str = "abc";
    pub const EVENT: &str = "/v3/accounts/bar/events/7";
    pub const VIDEOS: &str = "/v3/accounts/bar/events/7/videos?older=3&newer=0";

    pub fn channel() -> Channel {
        Channel {
            id: CHANNEL.to_owned(),
            secrets: ChannelSecrets {
                livestream: Some(LivestreamSecrets {
                    api_key: Some("foo".to_owned()),
                    account_id: Some("bar".to_owned()),
                    client_id: Some("client".to_owned()),
                }),
            },
        }
    }

    pub fn spec(kind: HandlerKind, event_id: Option<&str>) -> ItemSpec {
        let spec_type = match kind {
            HandlerKind::Video | HandlerKind::LiveVideo => SpecType::VideoSpec,
            _ => SpecType::CollectionSpec,
        };
        ItemSpec {
            id: format!("spec-{}-{CHANNEL}-7", kind.source()),
            channel: CHANNEL.to_owned(),
            kind: spec_type,
            source: kind.source().to_owned(),
            event: event_id.map(IdRef::new),
            video: None,
            season: None,
            episode: None,
            images: Vec::new(),
        }
    }

    pub fn handlers(
        bus: MockBus,
        transport: ScriptedTransport,
    ) -> (Handlers<MockBus>, Arc<MockBus>, Arc<ScriptedTransport>) {
        let bus = Arc::new(bus);
        let transport = Arc::new(transport);
        let config = ProviderConfig {
            request_interval: Duration::from_millis(1),
            page_size: 3,
            ..ProviderConfig::default()
        };
        let client = LivestreamClient::with_transport(&config, transport.clone());
        let handlers = Handlers::new(Arc::clone(&bus), client, config.channel_cache_ttl);
        (handlers, bus, transport)
    }
}
