//! Page-by-page retrieval of remote listings.
//!
//! Two styles are supported: opaque cursors (`has_more` + `next_cursor`) and
//! numbered pages with a declared total. Requests are issued one at a time
//! with a fixed pause between them. A failed page ends the walk and the
//! items gathered so far are returned alongside the error.

use std::future::Future;
use std::time::Duration;

use crate::domain::{AppError, CursorPage, NumberedPage, Result};

/// Items accumulated by a page walk, plus the error that cut it short.
#[derive(Debug)]
pub struct Fetched<T> {
    pub items: Vec<T>,
    /// Failure of the last attempted request, if the walk was interrupted.
    pub interrupted: Option<AppError>,
    /// Number of requests issued.
    pub requests: u32,
}

impl<T> Fetched<T> {
    /// Whether every page was retrieved.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.interrupted.is_none()
    }
}

/// Walks paginated listings with pacing between requests.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    delay: Duration,
}

impl Paginator {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Waits the configured pacing delay.
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    /// Collects every page of a cursor-paginated listing.
    ///
    /// The first call gets no cursor; the walk stops when a page reports
    /// `has_more == false`.
    pub async fn by_cursor<T, F, Fut>(&self, label: &str, mut fetch: F) -> Fetched<T>
    where
        F: FnMut(Option<String>) -> Fut,
        Fut: Future<Output = Result<CursorPage<T>>>,
    {
        let mut items = Vec::new();
        let mut cursor = None;
        let mut requests = 0;

        loop {
            requests += 1;
            let page = match fetch(cursor.take()).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(
                        listing = label,
                        code = e.code(),
                        fetched = items.len(),
                        "Error fetching page: {e}"
                    );
                    return Fetched { items, interrupted: Some(e), requests };
                }
            };

            items.extend(page.items);
            if !page.has_more {
                break;
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    tracing::warn!(listing = label, "has_more set without a cursor, stopping");
                    break;
                }
            }

            self.pause().await;
        }

        tracing::debug!(listing = label, items = items.len(), requests, "Listing complete");
        Fetched { items, interrupted: None, requests }
    }

    /// Collects every page of a page-count listing, starting at page 1.
    ///
    /// The walk stops once the current page number reaches the reported total.
    pub async fn by_page<T, F, Fut>(&self, label: &str, mut fetch: F) -> Fetched<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<NumberedPage<T>>>,
    {
        let mut items = Vec::new();
        let mut page_number = 1;
        let mut requests = 0;

        loop {
            requests += 1;
            let page = match fetch(page_number).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(
                        listing = label,
                        code = e.code(),
                        page = page_number,
                        "Error fetching page: {e}"
                    );
                    return Fetched { items, interrupted: Some(e), requests };
                }
            };

            items.extend(page.items);
            if page_number >= page.total_pages {
                break;
            }
            page_number += 1;

            self.pause().await;
        }

        tracing::debug!(listing = label, items = items.len(), requests, "Listing complete");
        Fetched { items, interrupted: None, requests }
    }
}
