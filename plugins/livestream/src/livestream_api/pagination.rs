//! Walking an event's paginated video feed.
//!
//! The feed is paged with a "last seen id" cursor: each continuation page is requested with
//! `offset_post_id` set to the id of the last entry of the previous page, and the API includes
//! that entry again as the first element of the new page.

use crate::livestream_api::{
    client::AccountClient,
    error::ApiError,
    types::PagedStream,
    videos::{FeedItem, Video},
};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::OnceLock;
use tokio_stream::StreamExt;
use tracing::instrument;

/// Everything posted to an event: its live entry and every VOD, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventVideoListing {
    pub live: Option<Video>,
    pub vods: Vec<Video>,
}

#[derive(Debug)]
enum WalkError {
    /// The very first page came back 404, meaning the event itself is missing.
    ParentNotFound,
    Api(ApiError),
}

impl AccountClient {
    /// Fetches every video page for an event and flattens them into one list.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(_))` - the live entry (if any) and all VODs in feed order
    /// * `Ok(None)` - the event does not exist
    /// * `Err(_)` - a page fetch failed; nothing fetched so far is returned
    #[instrument(skip(self), fields(account_id = %self.credentials().account_id))]
    pub async fn get_all_event_vods(
        &self,
        event_id: &str,
    ) -> Result<Option<EventVideoListing>, ApiError> {
        let page_size = self.client.page_size();
        let live = OnceLock::new();

        let vods = {
            let live = &live;
            let mut videos = PagedStream::new(move |cursor: Option<String>| async move {
                let page = self
                    .get_event_videos(event_id, cursor.as_deref())
                    .await
                    .map_err(WalkError::Api)?;

                let Some(page) = page else {
                    if cursor.is_none() {
                        return Err(WalkError::ParentNotFound);
                    }
                    tracing::debug!(?cursor, "continuation page not found, ending walk");
                    return Ok((VecDeque::new(), None));
                };

                if cursor.is_none()
                    && let Some(entry) = page.live
                {
                    let _ = live.set(entry);
                }

                let raw = page.vods.map(|feed| feed.data).unwrap_or_default();
                tracing::debug!(?cursor, entries = raw.len(), "fetched event video page");
                Ok(split_page(raw, cursor.as_deref(), page_size))
            });

            let mut vods = Vec::new();
            while let Some(video) = videos.next().await {
                match video {
                    Ok(video) => vods.push(video),
                    Err(WalkError::ParentNotFound) => return Ok(None),
                    Err(WalkError::Api(e)) => return Err(e),
                }
            }
            vods
        };

        tracing::debug!(vods = vods.len(), "finished walking event videos");
        Ok(Some(EventVideoListing {
            live: live.into_inner(),
            vods,
        }))
    }
}

/// Decides what one raw feed page contributes and where to continue from.
///
/// A continuation page (one fetched with `cursor`) repeats the previous page's last entry first,
/// so that entry is skipped. Only video entries are kept. The walk continues from the id of the
/// last raw entry, but only if the page was full.
fn split_page(
    raw: Vec<FeedItem>,
    cursor: Option<&str>,
    page_size: usize,
) -> (VecDeque<Video>, Option<String>) {
    let next_cursor = if raw.len() >= page_size {
        match raw.last().and_then(FeedItem::id) {
            Some(next) if cursor == Some(next.as_str()) => {
                tracing::warn!(cursor = %next, "feed did not advance past cursor, ending walk");
                None
            }
            Some(next) => Some(next),
            None => {
                tracing::warn!("last feed entry has no id, ending walk");
                None
            }
        }
    } else {
        None
    };

    let videos = raw
        .into_iter()
        .skip(usize::from(cursor.is_some()))
        .filter(FeedItem::is_video)
        .filter_map(|item| {
            let id = item.id();
            match item.into_video() {
                Ok(video) => Some(video),
                Err(e) => {
                    tracing::warn!(?id, error = %e, "skipping malformed video entry");
                    None
                }
            }
        })
        .collect();

    (videos, next_cursor)
}
