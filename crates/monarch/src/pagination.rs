use std::future::Future;

use futures_util::stream::{self, Stream, TryStreamExt};
use tracing::debug;

use crate::{Error, Result};

/// Window requested from an offset-paged collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

/// Walks an offset-paged collection as a lazy stream of items.
///
/// The first request starts at offset zero. Each subsequent request advances
/// the offset by the number of items the previous page returned, and the
/// stream ends on the first empty page. Nothing is requested until the stream
/// is polled, and a consumed stream cannot be restarted. An error from
/// `fetch` is yielded once and ends the stream. A zero `limit` could never
/// make progress, so it yields [`Error::PageSize`] without fetching.
pub fn paginate<'a, T, F, Fut>(limit: usize, fetch: F) -> impl Stream<Item = Result<T>> + 'a
where
    T: 'a,
    F: FnMut(Page) -> Fut + 'a,
    Fut: Future<Output = Result<Vec<T>>> + 'a,
{
    stream::try_unfold((fetch, 0usize), move |(mut fetch, offset)| async move {
        if limit == 0 {
            return Err(Error::PageSize);
        }

        let items = fetch(Page { offset, limit }).await?;
        debug!(offset, count = items.len(), "fetched page");

        if items.is_empty() {
            return Ok::<_, Error>(None);
        }

        let next = offset + items.len();
        Ok(Some((items, (fetch, next))))
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, Error>)))
    .try_flatten()
}
