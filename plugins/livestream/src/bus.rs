//! The boundary with the host catalog system.
//!
//! The host dispatches fetch requests to this provider by pattern, and the provider talks back to
//! the host over the same bus: it broadcasts diagnostic events, registers child specs it discovers,
//! and looks up channel records (which carry the Livestream credentials).

use crate::livestream_api::Credentials;
use crate::resource::Image;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A `{role, cmd, source}` triple the host routes messages by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern {
    pub role: String,
    pub cmd: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Pattern {
    /// The pattern a provider handler answers to.
    pub fn provider_get(source: impl Into<String>) -> Self {
        Self {
            role: "provider".to_owned(),
            cmd: "get".to_owned(),
            source: Some(source.into()),
        }
    }
}

/// Diagnostic severity, as the host names it. The provider itself only raises `warn` and `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// A host-visible diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<ItemSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecType {
    VideoSpec,
    CollectionSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    #[serde(deserialize_with = "crate::livestream_api::types::id_from_number_or_string")]
    pub id: String,
}

impl IdRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A request for the host to fetch a catalog item, and the input to every handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub id: String,
    /// Id of the channel whose credentials apply.
    pub channel: String,
    #[serde(rename = "type")]
    pub kind: SpecType,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<IdRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<IdRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
}

impl ItemSpec {
    pub fn event_id(&self) -> Option<&str> {
        non_empty(self.event.as_ref().map(|e| e.id.as_str()))
    }

    pub fn video_id(&self) -> Option<&str> {
        non_empty(self.video.as_ref().map(|v| v.id.as_str()))
    }

    pub fn season_key(&self) -> Option<&str> {
        non_empty(self.season.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// A host channel record. Only the parts this provider reads are modeled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub secrets: ChannelSecrets,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSecrets {
    #[serde(default)]
    pub livestream: Option<LivestreamSecrets>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivestreamSecrets {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default, deserialize_with = "crate::livestream_api::types::optional_id")]
    pub account_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
}

impl std::fmt::Debug for LivestreamSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LivestreamSecrets")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("account_id", &self.account_id)
            .field("client_id", &self.client_id)
            .finish()
    }
}

impl Channel {
    /// The channel's Livestream credentials, if the API key, account id and client id are all set.
    pub fn livestream_credentials(&self) -> Option<Credentials> {
        let secrets = self.secrets.livestream.as_ref()?;
        let api_key = non_empty(secrets.api_key.as_deref())?;
        let account_id = non_empty(secrets.account_id.as_deref())?;
        let client_id = non_empty(secrets.client_id.as_deref())?;
        Some(Credentials::new(
            api_key,
            account_id,
            Some(client_id.to_owned()),
        ))
    }
}

/// What the provider needs from the host.
pub trait HostBus: Send + Sync {
    /// Emits a diagnostic event. Delivery is best-effort.
    fn broadcast(&self, level: Level, event: DiagnosticEvent) -> impl Future<Output = ()> + Send;

    /// Registers a child spec with the host catalog.
    ///
    /// # Returns
    ///
    /// The id of the resource the host will produce for this spec, for use in relationship links.
    fn set_item_spec(&self, spec: ItemSpec) -> impl Future<Output = eyre::Result<String>> + Send;

    /// Looks up a channel record by id.
    fn get_channel(&self, id: &str) -> impl Future<Output = eyre::Result<Option<Channel>>> + Send;
}
