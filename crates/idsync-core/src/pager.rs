//! Cursor-driven walker for paginated remote collections.
//!
//! The remote hands back an opaque `pagedResultsCookie` with every page; a
//! missing or empty cookie marks the last page. Termination is only as good
//! as the remote's cursors: a server that keeps returning a cookie keeps the
//! walk going.

use std::future::Future;

use futures::stream::{self, Stream, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SyncError, SyncResult};

/// One page of a remote collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in remote order.
    #[serde(rename = "result", default = "Vec::new")]
    pub items: Vec<T>,

    /// Continuation token, `None` on the last page.
    #[serde(
        rename = "pagedResultsCookie",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// A final page.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }

    /// A page followed by more.
    pub fn more(items: Vec<T>, cursor: impl Into<String>) -> Self {
        Self {
            items,
            next_cursor: Some(cursor.into()),
        }
    }

    /// The cursor to continue with, treating an empty token as the end.
    #[must_use]
    pub fn continuation(&self) -> Option<&str> {
        self.next_cursor.as_deref().filter(|c| !c.is_empty())
    }
}

enum Cursor {
    Start,
    Next(String),
    Exhausted,
}

/// Lazily walk every page produced by `query`, yielding items in order.
///
/// `query` is called with `None` first and then with each returned cursor.
/// The stream is single-pass; an error ends it after the items already
/// yielded.
pub fn paginate<T, F, Fut>(query: F) -> impl Stream<Item = SyncResult<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = SyncResult<Page<T>>>,
{
    stream::try_unfold((query, Cursor::Start), |(mut query, cursor)| async move {
        let cursor = match cursor {
            Cursor::Exhausted => return Ok::<_, SyncError>(None),
            Cursor::Start => None,
            Cursor::Next(c) => Some(c),
        };
        let page = query(cursor).await?;
        let next = match page.continuation() {
            Some(c) => Cursor::Next(c.to_string()),
            None => Cursor::Exhausted,
        };
        debug!(
            items = page.items.len(),
            more = !matches!(next, Cursor::Exhausted),
            "fetched page"
        );
        Ok(Some((page.items, (query, next))))
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, SyncError>)))
    .try_flatten()
}

/// Walk a collection to completion and collect every item.
pub async fn fetch_all<T, F, Fut>(query: F) -> SyncResult<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = SyncResult<Page<T>>>,
{
    paginate(query).try_collect().await
}

/// Walk a collection to completion, counting items without keeping them.
pub async fn count_all<T, F, Fut>(query: F) -> SyncResult<usize>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = SyncResult<Page<T>>>,
{
    paginate(query)
        .try_fold(0usize, |count, _| async move { Ok::<_, SyncError>(count + 1) })
        .await
}

/// Split `items` into `Page`s of `size`, chaining cursors `"1"`, `"2"`, ...
///
/// Useful for remotes that return whole collections in one response.
pub fn chunk_pages<T: Clone>(items: &[T], size: usize) -> Vec<Page<T>> {
    let size = size.max(1);
    let chunks: Vec<&[T]> = items.chunks(size).collect();
    let total = chunks.len();
    if total == 0 {
        return vec![Page::last(Vec::new())];
    }
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            if i + 1 == total {
                Page::last(chunk.to_vec())
            } else {
                Page::more(chunk.to_vec(), (i + 1).to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn mock_collection(
        n: usize,
        k: usize,
    ) -> (
        Arc<AtomicUsize>,
        impl FnMut(Option<String>) -> futures::future::Ready<SyncResult<Page<usize>>>,
    ) {
        let items: Vec<usize> = (0..n).collect();
        let pages = chunk_pages(&items, k);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let query = move |cursor: Option<String>| {
            counter.fetch_add(1, Ordering::SeqCst);
            let index = cursor.map_or(0, |c| c.parse::<usize>().unwrap_or(0));
            futures::future::ready(Ok(pages[index].clone()))
        };
        (calls, query)
    }

    #[tokio::test]
    async fn test_fetch_all_returns_every_item_in_order() {
        let (calls, query) = mock_collection(10, 3);
        let items = fetch_all(query).await.unwrap();
        assert_eq!(items, (0..10).collect::<Vec<_>>());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_fetch_all_exact_multiple_of_page_size() {
        let (calls, query) = mock_collection(9, 3);
        let items = fetch_all(query).await.unwrap();
        assert_eq!(items.len(), 9);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fetch_all_single_page() {
        let (calls, query) = mock_collection(2, 50);
        assert_eq!(fetch_all(query).await.unwrap(), vec![0, 1]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_cursor_ends_walk() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let query = move |_cursor: Option<String>| {
            counter.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Ok(Page::more(vec![1, 2], "")))
        };
        assert_eq!(fetch_all(query).await.unwrap(), vec![1, 2]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_aborts_remaining_walk() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let query = move |cursor: Option<String>| {
            counter.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(match cursor {
                None => Ok(Page::more(vec![1], "a")),
                Some(_) => Err(SyncError::Transport {
                    status: 500,
                    message: "boom".to_string(),
                }),
            })
        };
        let result = fetch_all(query).await;
        assert!(matches!(result, Err(SyncError::Transport { status: 500, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_partial_items_are_yielded_before_error() {
        let query = |cursor: Option<String>| {
            futures::future::ready(match cursor {
                None => Ok(Page::more(vec![7, 8], "next")),
                Some(_) => Err(SyncError::Connection("reset".to_string())),
            })
        };
        let results: Vec<SyncResult<i32>> = paginate(query).collect().await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), &7);
        assert_eq!(results[1].as_ref().unwrap(), &8);
        assert!(results[2].is_err());
    }

    #[tokio::test]
    async fn test_count_all() {
        let (_, query) = mock_collection(25, 10);
        assert_eq!(count_all(query).await.unwrap(), 25);
    }

    #[test]
    fn test_page_deserializes_remote_shape() {
        let json = r#"{"result":[{"_id":"a"}],"resultCount":1,"pagedResultsCookie":"abc","remainingPagedResults":-1}"#;
        let page: Page<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.continuation(), Some("abc"));
    }

    #[test]
    fn test_page_null_cookie() {
        let json = r#"{"result":[],"pagedResultsCookie":null}"#;
        let page: Page<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert!(page.continuation().is_none());
    }
}
