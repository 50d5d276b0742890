//! In-process stand-ins for the host bus and the HTTP transport.
//!
//! Neither touches the network. [`MockBus`] records everything the provider sends to the host and
//! serves channel records from memory; [`ScriptedTransport`] answers requests from a table of
//! canned responses keyed by path and query, and keeps track of how requests were issued.

use crate::bus::{Channel, DiagnosticEvent, HostBus, ItemSpec, Level};
use crate::livestream_api::{HttpResponse, HttpTransport, SignedRequest};
use crate::livestream_api::transport::TransportFuture;
use crate::transforms::resource_id_for_spec;
use http::StatusCode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;

/// A host bus that remembers what it was told.
///
/// Registered specs are assigned the resource id the host would produce for them, i.e. the spec
/// id with its `spec` prefix swapped for `res`.
#[derive(Debug, Default)]
pub struct MockBus {
    channels: HashMap<String, Channel>,
    broadcasts: Mutex<Vec<(Level, DiagnosticEvent)>>,
    registered: Mutex<Vec<ItemSpec>>,
    channel_lookups: AtomicUsize,
    fail_registration: bool,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channels.insert(channel.id.clone(), channel);
        self
    }

    /// Makes every `set_item_spec` call fail.
    pub fn failing_registration(mut self) -> Self {
        self.fail_registration = true;
        self
    }

    pub async fn broadcasts(&self) -> Vec<(Level, DiagnosticEvent)> {
        self.broadcasts.lock().await.clone()
    }

    pub async fn broadcasts_at(&self, level: Level) -> Vec<DiagnosticEvent> {
        self.broadcasts
            .lock()
            .await
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub async fn registered_specs(&self) -> Vec<ItemSpec> {
        self.registered.lock().await.clone()
    }

    pub async fn channel_lookups(&self) -> usize {
        self.channel_lookups.load(Ordering::SeqCst)
    }
}

impl HostBus for MockBus {
    async fn broadcast(&self, level: Level, event: DiagnosticEvent) {
        tracing::debug!(?level, code = ?event.code, message = %event.message, "mock bus broadcast");
        self.broadcasts.lock().await.push((level, event));
    }

    async fn set_item_spec(&self, spec: ItemSpec) -> eyre::Result<String> {
        if self.fail_registration {
            eyre::bail!("host rejected spec '{}'", spec.id);
        }
        let id = resource_id_for_spec(&spec.id);
        self.registered.lock().await.push(spec);
        Ok(id)
    }

    async fn get_channel(&self, id: &str) -> eyre::Result<Option<Channel>> {
        self.channel_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.channels.get(id).cloned())
    }
}

/// A transport that serves canned responses.
///
/// Requests for anything not scripted get a JSON 404.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: HashMap<String, HttpResponse>,
    latency: Duration,
    requests: StdMutex<Vec<SignedRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// How long each response takes to arrive.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn respond(mut self, path_and_query: &str, status: u16, body: serde_json::Value) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.routes.insert(
            path_and_query.to_owned(),
            HttpResponse {
                status,
                content_type: Some("application/json; charset=utf-8".to_owned()),
                body: body.to_string(),
            },
        );
        self
    }

    pub fn respond_json(self, path_and_query: &str, body: serde_json::Value) -> Self {
        self.respond(path_and_query, 200, body)
    }

    pub fn respond_raw(mut self, path_and_query: &str, response: HttpResponse) -> Self {
        self.routes.insert(path_and_query.to_owned(), response);
        self
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<SignedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(SignedRequest::path_and_query)
            .collect()
    }

    /// The most requests that were ever being served at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl HttpTransport for ScriptedTransport {
    fn get<'a>(&'a self, request: &'a SignedRequest) -> TransportFuture<'a> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request.clone());

            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }

            let response = self
                .routes
                .get(&request.path_and_query())
                .cloned()
                .unwrap_or_else(|| HttpResponse {
                    status: StatusCode::NOT_FOUND,
                    content_type: Some("application/json".to_owned()),
                    body: r#"{"message":"Not Found"}"#.to_owned(),
                });

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(response)
        })
    }
}
