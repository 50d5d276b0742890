//! Time-bounded cache of host channel records.

use crate::bus::{Channel, HostBus};
use eyre::Context;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::instrument;

#[derive(Debug)]
struct CachedChannel {
    channel: Channel,
    fetched_at: Instant,
}

/// Caches channel lookups made over the host bus, keyed by channel id.
///
/// Entries older than the TTL are refetched on next access, and every miss drops all expired
/// entries. Lookups that find no channel are not cached.
#[derive(Debug)]
pub struct ChannelCache<B> {
    bus: Arc<B>,
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedChannel>>,
}

impl<B: HostBus> ChannelCache<B> {
    pub fn new(bus: Arc<B>, ttl: Duration) -> Self {
        Self {
            bus,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached channel, or fetches it from the host if missing or stale.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> eyre::Result<Option<Channel>> {
        {
            let entries = self.entries.lock().await;
            if let Some(cached) = entries.get(id)
                && cached.fetched_at.elapsed() < self.ttl
            {
                return Ok(Some(cached.channel.clone()));
            }
        }

        tracing::debug!("channel not cached, asking host");
        let channel = self
            .bus
            .get_channel(id)
            .await
            .with_context(|| format!("look up channel '{id}'"))?;

        let ttl = self.ttl;
        let mut entries = self.entries.lock().await;
        entries.retain(|_, cached| cached.fetched_at.elapsed() < ttl);
        match &channel {
            Some(channel) => {
                entries.insert(
                    id.to_owned(),
                    CachedChannel {
                        channel: channel.clone(),
                        fetched_at: Instant::now(),
                    },
                );
            }
            None => {
                entries.remove(id);
            }
        }
        Ok(channel)
    }

    pub async fn cached_count(&self) -> usize {
        self.entries.lock().await.len()
    }
}
