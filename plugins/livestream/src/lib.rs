//! Catalog provider for Livestream (livestream.com) events and videos.
//!
//! A [`Provider`] answers the host's `{role: "provider", cmd: "get", source}` requests for
//! `livestream-*` sources by fetching from the Livestream API and mapping the result to a catalog
//! [`Resource`](resource::Resource). Child items it discovers (the videos of an event, the seasons
//! of a series) are registered back with the host as specs of their own.

use crate::asset::{Asset, AssetError, AssetRequest};
use crate::bus::{DiagnosticEvent, HostBus, ItemSpec, Level, Pattern};
use crate::config::ProviderConfig;
use crate::handlers::{HandlerError, HandlerKind, Handlers};
use crate::livestream_api::{Credentials, LivestreamClient};
use crate::resource::Resource;
use eyre::Context;
use std::sync::Arc;

pub mod asset;
pub mod bus;
pub mod channel_cache;
pub mod config;
pub mod handlers;
pub mod livestream_api;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod resource;
pub mod signing;
pub mod transforms;

pub use handlers::compose::{EPISODE_TAG_PATTERN, SEASON_TAG_PATTERN, tag_to_key};

#[derive(Debug)]
pub struct Provider<B> {
    handlers: Handlers<B>,
}

impl<B: HostBus> Provider<B> {
    /// Sets up the provider against the real Livestream API.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn initialize(bus: Arc<B>, config: ProviderConfig) -> eyre::Result<Self> {
        config.validate().context("validate Livestream provider config")?;
        let client = LivestreamClient::new(&config).context("create Livestream client")?;
        tracing::info!(
            hostname = %config.hostname,
            api_version = config.api_version,
            request_interval_ms = config.request_interval.as_millis() as u64,
            "Livestream provider initialized"
        );
        Ok(Self::with_client(bus, client, &config))
    }

    pub fn with_client(bus: Arc<B>, client: LivestreamClient, config: &ProviderConfig) -> Self {
        Self {
            handlers: Handlers::new(bus, client, config.channel_cache_ttl),
        }
    }

    /// The patterns the host should route to this provider, and which handler each one runs.
    pub fn patterns(&self) -> Vec<(Pattern, HandlerKind)> {
        HandlerKind::ALL
            .into_iter()
            .map(|kind| (Pattern::provider_get(kind.source()), kind))
            .collect()
    }

    pub fn client(&self) -> &LivestreamClient {
        self.handlers.client()
    }

    /// See [`Handlers::handle`].
    pub async fn handle(
        &self,
        kind: HandlerKind,
        spec: &ItemSpec,
    ) -> Result<Option<Resource>, HandlerError> {
        self.handlers.handle(kind, spec).await
    }

    /// Routes a host request to its handler by pattern.
    pub async fn dispatch(
        &self,
        pattern: &Pattern,
        spec: &ItemSpec,
    ) -> Result<Option<Resource>, HandlerError> {
        let kind = self
            .patterns()
            .into_iter()
            .find_map(|(p, kind)| (p == *pattern).then_some(kind));

        match kind {
            Some(kind) => self.handle(kind, spec).await,
            None => {
                let source = pattern.source.clone().unwrap_or_default();
                let e = HandlerError::UnsupportedSource(source);
                tracing::error!(error = %e, spec_id = %spec.id, "no handler for pattern");
                self.handlers
                    .bus()
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

    /// Resolves a single asset by sub-provider name (`vod` or `live-video`).
    pub async fn get_asset(
        &self,
        credentials: Credentials,
        sub_provider: &str,
        args: &serde_json::Value,
    ) -> Result<Asset, AssetError> {
        let request = AssetRequest::parse(sub_provider, args)?;
        let account = self.client().account(credentials)?;
        asset::get_asset(&account, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{EVENT, channel, spec};
    use crate::mock::{MockBus, ScriptedTransport};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn provider(bus: MockBus, transport: ScriptedTransport) -> (Provider<MockBus>, Arc<MockBus>) {
        let bus = Arc::new(bus);
        let config = ProviderConfig {
            request_interval: Duration::from_millis(1),
            ..ProviderConfig::default()
        };
        let client = LivestreamClient::with_transport(&config, Arc::new(transport));
        (Provider::with_client(Arc::clone(&bus), client, &config), bus)
    }

    #[tokio::test]
    async fn test_patterns() {
        let (provider, _bus) = provider(MockBus::new(), ScriptedTransport::new());

        let sources: Vec<_> = provider
            .patterns()
            .into_iter()
            .map(|(pattern, _)| {
                assert_eq!(pattern.role, "provider");
                assert_eq!(pattern.cmd, "get");
                pattern.source.unwrap()
            })
            .collect();
        assert_eq!(
            sources,
            vec![
                "livestream-collection",
                "livestream-video",
                "livestream-live-video",
                "livestream-series",
                "livestream-season"
            ]
        );
    }

    #[tokio::test]
    async fn test_dispatch_by_pattern() {
        let (provider, _bus) = provider(
            MockBus::new().with_channel(channel()),
            ScriptedTransport::new().respond_json(EVENT, json!({ "id": 7 })),
        );

        let resource = provider
            .dispatch(
                &Pattern::provider_get("livestream-live-video"),
                &spec(HandlerKind::LiveVideo, Some("7")),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resource.id, "res-livestream-video-7");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_source() {
        let (provider, bus) = provider(MockBus::new(), ScriptedTransport::new());

        let err = provider
            .dispatch(
                &Pattern::provider_get("livestream-clip"),
                &spec(HandlerKind::Video, Some("7")),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), "UNSUPPORTED_SOURCE");
        let errors = bus.broadcasts_at(Level::Error).await;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code.as_deref(), Some("UNSUPPORTED_SOURCE"));
    }

    #[tokio::test]
    async fn test_get_asset() {
        let (provider, _bus) = provider(
            MockBus::new(),
            ScriptedTransport::new()
                .respond_json(EVENT, json!({ "id": 7, "ownerAccountId": 9 })),
        );

        let credentials = Credentials::new("foo", "bar", None);
        let asset = provider
            .get_asset(credentials.clone(), "live-video", &json!({ "eventId": 7 }))
            .await
            .unwrap();
        assert_eq!(asset.data.id, "event-7-live");

        let err = provider
            .get_asset(credentials, "clip", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, AssetError::Unsupported(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_initialize_rejects_invalid_config() {
        let config = ProviderConfig {
            page_size: 0,
            ..ProviderConfig::default()
        };
        assert!(Provider::initialize(Arc::new(MockBus::new()), config).is_err());
    }
}
