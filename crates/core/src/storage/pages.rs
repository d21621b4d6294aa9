//! Cursor-driven draining of paginated results.

use std::future::Future;

use super::Result;

/// One page of results and the cursor for the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T, C> {
    pub items: Vec<T>,
    /// `None` when this is the last page.
    pub next: Option<C>,
}

impl<T, C> Page<T, C> {
    /// A final page.
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

/// Fetches pages until the cursor runs out, calling `callback` once per item.
///
/// `fetch` receives `None` for the first page and the previous page's
/// cursor afterwards. The first error from either `fetch` or `callback`
/// stops the loop and is returned as is. Returns the number of items seen.
pub async fn drain_pages<T, C, F, Fut>(
    mut fetch: F,
    callback: &mut (dyn FnMut(T) -> Result<()> + Send + '_),
) -> Result<usize>
where
    F: FnMut(Option<C>) -> Fut,
    Fut: Future<Output = Result<Page<T, C>>>,
{
    let mut cursor = None;
    let mut seen = 0;

    loop {
        let page = fetch(cursor.take()).await?;

        for item in page.items {
            callback(item)?;
            seen += 1;
        }

        match page.next {
            Some(next) => cursor = Some(next),
            None => return Ok(seen),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DatabaseError;

    type Fetched = std::future::Ready<Result<Page<u32, usize>>>;

    fn paged(data: Vec<u32>, size: usize) -> impl FnMut(Option<usize>) -> Fetched {
        move |cursor| {
            let start = cursor.unwrap_or(0);
            let end = (start + size).min(data.len());
            let next = (end < data.len()).then_some(end);
            std::future::ready(Ok(Page {
                items: data[start..end].to_vec(),
                next,
            }))
        }
    }

    #[tokio::test]
    async fn test_visits_every_item_across_pages() {
        let mut seen = Vec::new();
        let count = drain_pages(paged((0..10).collect(), 3), &mut |n| {
            seen.push(n);
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(count, 10);
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_empty_source() {
        let mut calls = 0;
        let count = drain_pages(paged(Vec::new(), 3), &mut |_| {
            calls += 1;
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(count, 0);
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_empty_page_with_cursor_keeps_going() {
        let mut fetches = 0;
        let fetch = |cursor: Option<u8>| {
            fetches += 1;
            let page = match cursor {
                None => Page {
                    items: vec![],
                    next: Some(1),
                },
                Some(_) => Page::last(vec!["a", "b"]),
            };
            std::future::ready(Ok(page))
        };

        let mut seen = Vec::new();
        drain_pages(fetch, &mut |s| {
            seen.push(s);
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(fetches, 2);
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_callback_error_stops_scan() {
        let mut seen = Vec::new();
        let result = drain_pages(paged((0..10).collect(), 4), &mut |n| {
            if n == 5 {
                return Err(DatabaseError::Callback("stop".into()));
            }
            seen.push(n);
            Ok(())
        })
        .await;

        assert_eq!(result, Err(DatabaseError::Callback("stop".into())));
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_fetch_error_is_returned() {
        let fetch = |cursor: Option<u8>| {
            std::future::ready(match cursor {
                None => Ok(Page {
                    items: vec![1],
                    next: Some(1),
                }),
                Some(_) => Err(DatabaseError::Backend("throttled".into())),
            })
        };

        let result = drain_pages(fetch, &mut |_: i32| Ok(())).await;
        assert_eq!(result, Err(DatabaseError::Backend("throttled".into())));
    }
}
