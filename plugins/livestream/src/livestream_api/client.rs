//! Core Livestream API client functionality.

use crate::config::ProviderConfig;
use crate::livestream_api::{
    error::ApiError,
    events::{Account, Event},
    queue::RequestQueue,
    request::{Endpoint, SignedRequest},
    transport::{HttpResponse, HttpTransport, ReqwestTransport},
    videos::{EventVideosResponse, Video},
};
use http::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::instrument;

/// The secrets needed to call the API on behalf of one account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub account_id: String,
    /// Only needed to sign playback URLs.
    pub client_id: Option<String>,
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        account_id: impl Into<String>,
        client_id: Option<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            account_id: account_id.into(),
            client_id,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("client_id", &self.client_id)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Livestream credentials are missing {0}")]
pub struct MissingCredential(pub &'static str);

/// Client for the Livestream API.
///
/// All requests made through a client, and through every [`AccountClient`] derived from it, share
/// one [`RequestQueue`]. Clones are cheap and share that queue too.
#[derive(Debug, Clone)]
pub struct LivestreamClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    endpoint: Endpoint,
    page_size: usize,
    queue: RequestQueue,
    transport: Arc<dyn HttpTransport>,
}

impl LivestreamClient {
    /// Creates a client that talks to the real API over HTTPS.
    ///
    /// Must be called from within a Tokio runtime, since it starts the request queue.
    pub fn new(config: &ProviderConfig) -> eyre::Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: &ProviderConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            inner: Arc::new(Inner {
                endpoint: config.endpoint(),
                page_size: config.page_size.max(1),
                queue: RequestQueue::new(config.request_interval),
                transport,
            }),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.inner.endpoint
    }

    pub fn page_size(&self) -> usize {
        self.inner.page_size
    }

    /// Scopes this client to one account.
    ///
    /// Fails if the API key or the account id is empty.
    pub fn account(&self, credentials: Credentials) -> Result<AccountClient, MissingCredential> {
        if credentials.api_key.is_empty() {
            return Err(MissingCredential("an API key"));
        }
        if credentials.account_id.is_empty() {
            return Err(MissingCredential("an account id"));
        }
        Ok(AccountClient {
            client: self.clone(),
            credentials,
        })
    }

    /// Lists the accounts the given API key has access to.
    ///
    /// See: <https://livestream.com/developers/docs/api/#get-accounts>
    #[instrument(skip(self, api_key))]
    pub async fn list_accounts(&self, api_key: &str) -> Result<Vec<Account>, ApiError> {
        Ok(self
            .get_json(api_key, "/accounts", &[])
            .await?
            .unwrap_or_default())
    }

    /// Issues a queued GET and decodes a JSON body.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(_))` - HTTP 200 with a body of the expected shape
    /// * `Ok(None)` - HTTP 404
    /// * `Err(_)` - anything else; see [`ApiError`]
    async fn get_json<T>(
        &self,
        api_key: &str,
        resource_path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let request = SignedRequest::build(&self.inner.endpoint, api_key, resource_path, query);
        let url = request.url();
        let transport = Arc::clone(&self.inner.transport);

        let response = self
            .inner
            .queue
            .enqueue(move || async move {
                let response = transport.get(&request).await?;
                Ok::<_, ApiError>(response)
            })
            .await?;

        tracing::debug!(%url, status = %response.status, "Livestream API response");
        map_response(&url, response)
    }
}

/// Turns a raw HTTP outcome into a decoded body, an absence, or a structured error.
pub(crate) fn map_response<T: DeserializeOwned>(
    url: &str,
    response: HttpResponse,
) -> Result<Option<T>, ApiError> {
    let HttpResponse {
        status,
        content_type,
        body,
    } = response;

    match status {
        StatusCode::OK => {}
        StatusCode::NOT_FOUND => return Ok(None),
        StatusCode::FORBIDDEN => {
            tracing::warn!(%url, "Livestream API rate limit exceeded");
            return Err(ApiError::RateLimited {
                url: url.to_owned(),
                body,
            });
        }
        status => {
            return Err(ApiError::UnexpectedStatus {
                status,
                url: url.to_owned(),
                body,
            });
        }
    }

    if let Some(content_type) = content_type.as_deref()
        && !is_json(content_type)
    {
        return Err(ApiError::UnexpectedContentType {
            url: url.to_owned(),
            content_type: Some(content_type.to_owned()),
            body,
        });
    }

    match serde_json::from_str(&body) {
        Ok(decoded) => Ok(Some(decoded)),
        Err(source) => Err(ApiError::InvalidJson {
            status,
            url: url.to_owned(),
            body,
            source,
        }),
    }
}

fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|mime| mime.eq_ignore_ascii_case("application/json"))
}

/// A [`LivestreamClient`] bound to one account's credentials.
#[derive(Debug, Clone)]
pub struct AccountClient {
    pub(crate) client: LivestreamClient,
    credentials: Credentials,
}

impl AccountClient {
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.client.endpoint()
    }

    fn event_path(&self, event_id: &str) -> String {
        format!("/accounts/{}/events/{event_id}", self.credentials.account_id)
    }

    /// Fetches one event; `None` if it does not exist.
    ///
    /// See: <https://livestream.com/developers/docs/api/#get-specific-event>
    #[instrument(skip(self), fields(account_id = %self.credentials.account_id))]
    pub async fn get_event(&self, event_id: &str) -> Result<Option<Event>, ApiError> {
        self.client
            .get_json(&self.credentials.api_key, &self.event_path(event_id), &[])
            .await
    }

    /// Fetches one page of an event's video feed, plus its live entry.
    ///
    /// Without a cursor this is the newest page. With one, the page starts at (and includes) the
    /// feed entry whose id is `cursor`, followed by older entries.
    ///
    /// See: <https://livestream.com/developers/docs/api/#get-event-videos>
    #[instrument(skip(self), fields(account_id = %self.credentials.account_id))]
    pub async fn get_event_videos(
        &self,
        event_id: &str,
        cursor: Option<&str>,
    ) -> Result<Option<EventVideosResponse>, ApiError> {
        let older = self.client.page_size().to_string();
        let mut query = vec![("older", older.as_str()), ("newer", "0")];
        if let Some(cursor) = cursor {
            query.push(("offset_post_id", cursor));
        }
        let path = format!("{}/videos", self.event_path(event_id));
        self.client
            .get_json(&self.credentials.api_key, &path, &query)
            .await
    }

    /// Fetches one video posted to an event; `None` if it does not exist.
    ///
    /// See: <https://livestream.com/developers/docs/api/#get-specific-video>
    #[instrument(skip(self), fields(account_id = %self.credentials.account_id))]
    pub async fn get_video(
        &self,
        event_id: &str,
        video_id: &str,
    ) -> Result<Option<Video>, ApiError> {
        let path = format!("{}/videos/{video_id}", self.event_path(event_id));
        self.client
            .get_json(&self.credentials.api_key, &path, &[])
            .await
    }
}
