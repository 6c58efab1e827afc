//! # Pages — Lazy Pagination Over List Endpoints
//!
//! List endpoints are read page by page (1-indexed, [`PAGE_SIZE`] items per
//! page) until the first page with no items. [`Pages`] is a finite,
//! non-restartable iterator over those pages: it issues exactly one request
//! per page up to and including the empty one, and yields nothing afterwards.
//!
//! At most `max_pages` non-empty pages are accepted. Page `max_pages + 1` is
//! still requested: if it is empty the stream ends cleanly, otherwise the
//! endpoint is treated as misbehaving and an error is yielded rather than a
//! silently truncated result.

use anyhow::Result;
use std::iter::FusedIterator;
use std::marker::PhantomData;

/// Items requested per page.
pub const PAGE_SIZE: u32 = 100;

/// Default upper bound on pages read from a single list endpoint.
pub const DEFAULT_MAX_PAGES: u32 = 10_000;

/// Iterator of non-empty pages produced by `fetch(page_number)`.
pub struct Pages<T, F>
where
    F: FnMut(u32) -> Result<Vec<T>>,
{
    fetch: F,
    next_page: u32,
    max_pages: u32,
    done: bool,
    _item: PhantomData<fn() -> T>,
}

impl<T, F> Pages<T, F>
where
    F: FnMut(u32) -> Result<Vec<T>>,
{
    pub fn new(fetch: F) -> Self {
        Self::with_max_pages(fetch, DEFAULT_MAX_PAGES)
    }

    pub fn with_max_pages(fetch: F, max_pages: u32) -> Self {
        Pages {
            fetch,
            next_page: 1,
            max_pages,
            done: false,
            _item: PhantomData,
        }
    }

    /// Drain every page into one vector, stopping at the first error.
    pub fn flatten_all(self) -> Result<Vec<T>> {
        let mut all = Vec::new();
        for page in self {
            all.extend(page?);
        }
        Ok(all)
    }
}

impl<T, F> Iterator for Pages<T, F>
where
    F: FnMut(u32) -> Result<Vec<T>>,
{
    type Item = Result<Vec<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let page = self.next_page;
        match (self.fetch)(page) {
            Ok(items) if items.is_empty() => {
                self.done = true;
                None
            }
            // The page past the ceiling is only read to confirm the end.
            Ok(_) if page > self.max_pages => {
                self.done = true;
                Some(Err(anyhow::anyhow!(
                    "endpoint returned more than {} non-empty pages; giving up",
                    self.max_pages
                )))
            }
            Ok(items) => {
                self.next_page += 1;
                Some(Ok(items))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<T, F> FusedIterator for Pages<T, F> where F: FnMut(u32) -> Result<Vec<T>> {}
