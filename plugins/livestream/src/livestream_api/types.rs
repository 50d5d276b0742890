//! Shared types and streaming infrastructure for the Livestream API client.

use serde::{Deserialize, Deserializer};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio_stream::Stream;

type PageFuture<'a, F, T, E> =
    Pin<Box<dyn Future<Output = Result<(F, (VecDeque<T>, Option<String>)), E>> + 'a + Send>>;

/// A stream over a cursor-paged endpoint that fetches each page as the previous one runs out.
///
/// The fetcher is called with `None` for the first page and with the cursor it returned
/// alongside each page after that. The walk ends when a page comes back without a cursor, or at
/// the first error, which is yielded as the final item.
pub struct PagedStream<'a, T, F, E> {
    buffered: VecDeque<T>,
    /// The in-flight (or not yet polled) fetch of the next page; it owns the fetcher meanwhile.
    next_page: Option<PageFuture<'a, F, T, E>>,
}

impl<'a, T, F, E> PagedStream<'a, T, F, E> {
    pub fn new<Fut>(fetcher: F) -> Self
    where
        F: Fn(Option<String>) -> Fut,
        F: Send + 'a,
        Fut: Future<Output = Result<(VecDeque<T>, Option<String>), E>> + Send + 'a,
    {
        Self {
            buffered: VecDeque::new(),
            next_page: Some(fetch_page(fetcher, None)),
        }
    }
}

fn fetch_page<'a, T, F, Fut, E>(fetcher: F, cursor: Option<String>) -> PageFuture<'a, F, T, E>
where
    F: Fn(Option<String>) -> Fut,
    F: Send + 'a,
    Fut: Future<Output = Result<(VecDeque<T>, Option<String>), E>> + Send + 'a,
{
    Box::pin(async move {
        let page = fetcher(cursor).await?;
        Ok((fetcher, page))
    })
}

impl<'a, T: Unpin, F, E> Unpin for PagedStream<'a, T, F, E> {}

impl<'a, T: Unpin, F, Fut, E> Stream for PagedStream<'a, T, F, E>
where
    F: Fn(Option<String>) -> Fut,
    F: Send + 'a,
    Fut: Future<Output = Result<(VecDeque<T>, Option<String>), E>> + Send + 'a,
{
    type Item = Result<T, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }
            let Some(next_page) = self.next_page.as_mut() else {
                return Poll::Ready(None);
            };

            match next_page.as_mut().poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(e)) => {
                    self.next_page = None;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(Ok((fetcher, (items, cursor)))) => {
                    self.buffered.extend(items);
                    // not polled until the buffered items have been handed out
                    self.next_page = cursor.map(|cursor| fetch_page(fetcher, Some(cursor)));
                }
            }
        }
    }
}

/// Livestream identifiers are numeric in most payloads but arrive as strings in some; we always
/// keep them as strings.
pub(crate) fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Unsigned(u64),
        Signed(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Unsigned(n) => n.to_string(),
        RawId::Signed(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// Like [`id_from_number_or_string`], but `null` and absent both become `None`.
///
/// Fields using this must also carry `#[serde(default)]`.
pub(crate) fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "id_from_number_or_string")] String);

    Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(id)| id))
}

/// Tags come back either as a JSON array or as a single comma-separated string.
pub(crate) fn tags_from_list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTags {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Option::<RawTags>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(RawTags::List(tags)) => tags,
        Some(RawTags::Joined(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_owned)
            .collect(),
    })
}

/// Pulls an identifier out of an untyped payload, accepting numbers or strings.
pub(crate) fn id_of(value: &serde_json::Value) -> Option<String> {
    match value.get("id")? {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// An image reference, as found in `logo` blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logo {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub small_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio_stream::StreamExt;

    #[derive(Debug, Deserialize)]
    struct Ids {
        #[serde(deserialize_with = "id_from_number_or_string")]
        id: String,
        #[serde(default, deserialize_with = "optional_id")]
        parent: Option<String>,
        #[serde(default, deserialize_with = "tags_from_list_or_csv")]
        tags: Vec<String>,
    }

    #[test]
    fn test_ids_accept_numbers_and_strings() {
        let numeric: Ids = serde_json::from_value(json!({ "id": 42, "parent": 7 })).unwrap();
        assert_eq!(numeric.id, "42");
        assert_eq!(numeric.parent.as_deref(), Some("7"));

        let text: Ids = serde_json::from_value(json!({ "id": "abc", "parent": null })).unwrap();
        assert_eq!(text.id, "abc");
        assert_eq!(text.parent, None);

        let absent: Ids = serde_json::from_value(json!({ "id": 1 })).unwrap();
        assert_eq!(absent.parent, None);
        assert!(absent.tags.is_empty());
    }

    #[test]
    fn test_tags_accept_list_or_joined_string() {
        let listed: Ids =
            serde_json::from_value(json!({ "id": 1, "tags": ["S-1", "E-2"] })).unwrap();
        assert_eq!(listed.tags, vec!["S-1", "E-2"]);

        let joined: Ids = serde_json::from_value(json!({ "id": 1, "tags": "S-1, E-2,," })).unwrap();
        assert_eq!(joined.tags, vec!["S-1", "E-2"]);
    }

    #[test]
    fn test_id_of() {
        assert_eq!(id_of(&json!({ "id": 9 })).as_deref(), Some("9"));
        assert_eq!(id_of(&json!({ "id": "x" })).as_deref(), Some("x"));
        assert_eq!(id_of(&json!({ "id": "" })), None);
        assert_eq!(id_of(&json!({})), None);
    }

    #[tokio::test]
    async fn test_paged_stream_follows_cursors() {
        let stream = PagedStream::new(|cursor: Option<String>| async move {
            let page = match cursor.as_deref() {
                None => (VecDeque::from([1, 2]), Some("a".to_owned())),
                Some("a") => (VecDeque::from([3]), Some("b".to_owned())),
                Some("b") => (VecDeque::new(), Some("c".to_owned())),
                Some(_) => (VecDeque::from([4]), None),
            };
            Ok::<_, &'static str>(page)
        });
        let items: Result<Vec<i32>, _> = stream.collect().await;
        assert_eq!(items, Ok(vec![1, 2, 3, 4]));
    }

    #[tokio::test]
    async fn test_paged_stream_stops_at_error() {
        let mut stream = PagedStream::new(|cursor: Option<String>| async move {
            match cursor {
                None => Ok((VecDeque::from([1]), Some("next".to_owned()))),
                Some(_) => Err("boom"),
            }
        });
        assert_eq!(stream.next().await, Some(Ok(1)));
        assert_eq!(stream.next().await, Some(Err("boom")));
        assert_eq!(stream.next().await, None);
    }
}
