//! Provider configuration.

use crate::livestream_api::request::Endpoint;
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for talking to the Livestream API.
///
/// Every field has a default, so an empty configuration document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub hostname: String,
    pub api_version: u32,
    /// Pause between the completion of one request and the start of the next.
    ///
    /// Livestream allows roughly 600 requests per minute per account.
    #[serde(with = "millis")]
    pub request_interval: Duration,
    /// Number of feed entries requested per page when walking event videos.
    pub page_size: usize,
    /// Connect and response timeout for each HTTP request.
    #[serde(with = "millis")]
    pub timeout: Duration,
    #[serde(with = "millis")]
    pub channel_cache_ttl: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            hostname: "livestreamapis.com".to_owned(),
            api_version: 3,
            request_interval: Duration::from_millis(120),
            page_size: 10,
            timeout: Duration::from_secs(10),
            channel_cache_ttl: Duration::from_secs(5 * 60),
        }
    }
}

impl ProviderConfig {
    /// Defaults, overridden by any `LIVESTREAM_*` variables present in the environment.
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let mut config = Self::default();
        if let Some(hostname) = lookup("LIVESTREAM_HOSTNAME") {
            config.hostname = hostname;
        }
        if let Some(version) = lookup("LIVESTREAM_API_VERSION") {
            config.api_version = version
                .trim()
                .trim_start_matches('v')
                .parse()
                .with_context(|| format!("parse LIVESTREAM_API_VERSION '{version}'"))?;
        }
        if let Some(interval) = lookup("LIVESTREAM_REQUEST_INTERVAL_MS") {
            let millis: u64 = interval
                .trim()
                .parse()
                .with_context(|| format!("parse LIVESTREAM_REQUEST_INTERVAL_MS '{interval}'"))?;
            config.request_interval = Duration::from_millis(millis);
        }
        if let Some(page_size) = lookup("LIVESTREAM_PAGE_SIZE") {
            config.page_size = page_size
                .trim()
                .parse()
                .with_context(|| format!("parse LIVESTREAM_PAGE_SIZE '{page_size}'"))?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        if self.hostname.is_empty() {
            eyre::bail!("Livestream hostname must not be empty");
        }
        if self.page_size == 0 {
            eyre::bail!("Livestream page size must be at least 1");
        }
        Ok(())
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.hostname.clone(), self.api_version)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ProviderConfig::default());
        assert_eq!(config.request_interval, Duration::from_millis(120));
        assert_eq!(config.endpoint().base_url(), "https://livestreamapis.com/v3");
    }

    #[test]
    fn test_env_overrides() {
        let config = ProviderConfig::from_lookup(lookup(&[
            ("LIVESTREAM_HOSTNAME", "api.example.test"),
            ("LIVESTREAM_API_VERSION", "v2"),
            ("LIVESTREAM_REQUEST_INTERVAL_MS", "200"),
            ("LIVESTREAM_PAGE_SIZE", "20"),
        ]))
        .unwrap();
        assert_eq!(config.hostname, "api.example.test");
        assert_eq!(config.api_version, 2);
        assert_eq!(config.request_interval, Duration::from_millis(200));
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn test_rejects_bad_values() {
        let result = ProviderConfig::from_lookup(lookup(&[("LIVESTREAM_PAGE_SIZE", "lots")]));
        assert!(result.is_err(), "{result:?}");

        let result = ProviderConfig::from_lookup(lookup(&[("LIVESTREAM_PAGE_SIZE", "0")]));
        assert!(result.is_err(), "{result:?}");
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ProviderConfig =
            serde_json::from_str(r#"{ "request_interval": 250, "page_size": 5 }"#).unwrap();
        assert_eq!(config.request_interval, Duration::from_millis(250));
        assert_eq!(config.page_size, 5);
        assert_eq!(config.hostname, "livestreamapis.com");
    }
}
