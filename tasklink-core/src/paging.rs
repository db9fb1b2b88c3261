//! Lazy iteration over paginated remote collections.
//!
//! [`Pages`] wraps a page-fetching closure and yields items one at a time,
//! requesting the next page only when the current one is drained. Nothing is
//! accumulated across pages, so a full-collection scan (Motion has no
//! server-side "updated since" filter) holds one page in memory at a time.
//! Building a new `Pages` from the same closure restarts the scan.
//!
//! A fetch error is yielded once as `Some(Err(_))`; the iterator is fused
//! afterwards.

use std::collections::VecDeque;

use crate::error::RemoteRequestError;

/// One page of results plus the token for the following page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` on the last page.
    pub next: Option<String>,
}

pub struct Pages<T, F> {
    fetch: F,
    cursor: Option<String>,
    buffer: VecDeque<T>,
    exhausted: bool,
    pages_fetched: usize,
}

impl<T, F> Pages<T, F>
where
    F: FnMut(Option<&str>) -> Result<Page<T>, RemoteRequestError>,
{
    /// `fetch` receives `None` for the first page and the previous page's
    /// `next` token afterwards.
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            cursor: None,
            buffer: VecDeque::new(),
            exhausted: false,
            pages_fetched: 0,
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    fn fetch_next_page(&mut self) -> Result<(), RemoteRequestError> {
        let page = (self.fetch)(self.cursor.as_deref())?;
        self.pages_fetched += 1;

        // Stop on an empty page or a token that does not advance.
        let stalled = page.next.is_some() && page.next == self.cursor;
        if page.items.is_empty() || page.next.is_none() || stalled {
            self.exhausted = true;
        }
        self.cursor = page.next;
        self.buffer.extend(page.items);
        Ok(())
    }
}

impl<T, F> Iterator for Pages<T, F>
where
    F: FnMut(Option<&str>) -> Result<Page<T>, RemoteRequestError>,
{
    type Item = Result<T, RemoteRequestError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if self.exhausted {
                return None;
            }
            if let Err(err) = self.fetch_next_page() {
                self.exhausted = true;
                return Some(Err(err));
            }
        }
    }
}
