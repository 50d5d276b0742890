//! Construction of authenticated request descriptors.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Where the Livestream API lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub hostname: String,
    pub version: u32,
}

impl Endpoint {
    pub fn new(hostname: impl Into<String>, version: u32) -> Self {
        Self {
            hostname: hostname.into(),
            version,
        }
    }

    /// `https://{hostname}/v{version}`
    pub fn base_url(&self) -> String {
        format!("https://{}/v{}", self.hostname, self.version)
    }

    /// The HLS master playlist for an event's live stream.
    pub fn master_playlist_url(&self, account_id: &str, event_id: &str) -> String {
        format!(
            "{}/accounts/{account_id}/events/{event_id}/master.m3u8",
            self.base_url()
        )
    }
}

/// A fully-formed GET request, ready to hand to an [`HttpTransport`].
///
/// [`HttpTransport`]: crate::livestream_api::transport::HttpTransport
#[derive(Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub hostname: String,
    /// Absolute path including the version prefix, e.g. `/v3/accounts/1/events/2`.
    pub path: String,
    /// Encoded query string without the leading `?`.
    pub query: Option<String>,
    pub authorization: String,
}

impl SignedRequest {
    /// Builds the request for `resource_path` (relative to the versioned base) with the given
    /// query parameters, signed with `api_key`.
    ///
    /// An empty parameter list produces no query string at all.
    pub fn build(
        endpoint: &Endpoint,
        api_key: &str,
        resource_path: &str,
        query: &[(&str, &str)],
    ) -> Self {
        let query = if query.is_empty() {
            None
        } else {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            for (key, value) in query {
                serializer.append_pair(key, value);
            }
            Some(serializer.finish())
        };

        Self {
            hostname: endpoint.hostname.clone(),
            path: format!("/v{}{resource_path}", endpoint.version),
            query,
            authorization: basic_authorization(api_key),
        }
    }

    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{query}", self.path),
            None => self.path.clone(),
        }
    }

    pub fn url(&self) -> String {
        format!("https://{}{}", self.hostname, self.path_and_query())
    }
}

// The authorization header carries the API key, so keep it out of logs.
impl std::fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedRequest")
            .field("hostname", &self.hostname)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("authorization", &"<redacted>")
            .finish()
    }
}

/// API keys are sent as the Basic-auth username with an empty password.
///
/// See: <https://livestream.com/developers/docs/api/#api-keys>
pub fn basic_authorization(api_key: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{api_key}:")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Endpoint {
        Endpoint::new("livestreamapis.com", 3)
    }

    #[test]
    fn test_basic_authorization() {
        // base64("foo:")
        assert_eq!(basic_authorization("foo"), "Basic Zm9vOg==");
    }

    #[test]
    fn test_build_without_query() {
        let request = SignedRequest::build(&endpoint(), "foo", "/accounts/bar/events/1", &[]);
        assert_eq!(request.path, "/v3/accounts/bar/events/1");
        assert_eq!(request.query, None);
        assert_eq!(
            request.url(),
            "https://livestreamapis.com/v3/accounts/bar/events/1"
        );
    }

    #[test]
    fn test_build_with_query_keeps_parameter_order() {
        let request = SignedRequest::build(
            &endpoint(),
            "foo",
            "/accounts/bar/events/1/videos",
            &[("older", "10"), ("newer", "0"), ("offset_post_id", "42")],
        );
        assert_eq!(
            request.path_and_query(),
            "/v3/accounts/bar/events/1/videos?older=10&newer=0&offset_post_id=42"
        );
    }

    #[test]
    fn test_debug_redacts_authorization() {
        let request = SignedRequest::build(&endpoint(), "very-secret", "/accounts", &[]);
        let debug = format!("{request:?}");
        assert!(!debug.contains(&basic_authorization("very-secret")), "{debug}");
        assert!(debug.contains("<redacted>"), "{debug}");
    }

    #[test]
    fn test_master_playlist_url() {
        assert_eq!(
            endpoint().master_playlist_url("bar", "online"),
            "https://livestreamapis.com/v3/accounts/bar/events/online/master.m3u8"
        );
    }
}
