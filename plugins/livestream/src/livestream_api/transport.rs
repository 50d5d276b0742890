//! The HTTP transport boundary.
//!
//! Everything below [`HttpTransport::get`] (TLS, sockets, timeouts) belongs to the transport; the
//! client above it only ever sees a status, a content type and a body.

use crate::livestream_api::error::TransportError;
use crate::livestream_api::request::SignedRequest;
use eyre::Context;
use http::StatusCode;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>>;

/// Performs a single GET and reports what came back.
///
/// Implementations must not interpret the status code; that is the client's job.
pub trait HttpTransport: std::fmt::Debug + Send + Sync {
    fn get<'a>(&'a self, request: &'a SignedRequest) -> TransportFuture<'a>;
}

/// The production transport, backed by [`reqwest`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport whose connect and overall response time are both bounded by `timeout`.
    pub fn new(timeout: Duration) -> eyre::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .context("build Livestream HTTP client")?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get<'a>(&'a self, request: &'a SignedRequest) -> TransportFuture<'a> {
        Box::pin(async move {
            let url = request.url();
            tracing::trace!(path = %request.path, query = ?request.query, "sending request");

            let response = self
                .client
                .get(&url)
                .header(AUTHORIZATION, &request.authorization)
                .header(ACCEPT, "*/*")
                .send()
                .await
                .map_err(|source| TransportError::Send {
                    url: url.clone(),
                    source,
                })?;

            let status = response.status();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let body = response
                .text()
                .await
                .map_err(|source| TransportError::Body { url, source })?;

            Ok(HttpResponse {
                status,
                content_type,
                body,
            })
        })
    }
}
