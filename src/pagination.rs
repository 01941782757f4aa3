//! Fixed-size, 1-based pages over an ordered result set.

use std::fmt::Display;

use log::debug;

/// Number of questions on one page.
pub const PAGE_SIZE: usize = 10;

/// A 1-based page number. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page(usize);

impl Default for Page {
    fn default() -> Self {
        Page(1)
    }
}

impl Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Page {
    /// Zero and negative numbers are clamped to the first page.
    pub fn new(number: i64) -> Self {
        if number < 1 {
            Page::default()
        } else {
            Page(usize::try_from(number).unwrap_or(usize::MAX))
        }
    }

    pub fn number(self) -> usize {
        self.0
    }

    /** Listing happens via /questions?page=N, this parses the "page=N" part for
    you. Missing or non-numeric values give the first page. */
    pub fn from_query_string(query_string: &str) -> Self {
        use lazy_static::lazy_static;
        use regex::Regex;
        lazy_static! {
            static ref RE: Regex = Regex::new(r"(?:^|&)page=([^&]*)").unwrap();
        }

        let page = RE
            .captures(query_string)
            .and_then(|cap| cap.get(1))
            .and_then(|raw| raw.as_str().trim().parse::<i64>().ok())
            .map(Page::new)
            .unwrap_or_default();

        debug!("Query {:?} resolved to page {}", query_string, page);
        page
    }

    /// Index range `[(page-1)*PAGE_SIZE, page*PAGE_SIZE)` clipped to `len`.
    fn bounds(self, len: usize) -> (usize, usize) {
        let start = (self.0 - 1).saturating_mul(PAGE_SIZE).min(len);
        let end = start.saturating_add(PAGE_SIZE).min(len);
        (start, end)
    }
}

/// Returns the items on `page`. A page past the end is empty, not an error.
pub fn paginate<T>(items: &[T], page: Page) -> &[T] {
    let (start, end) = page.bounds(items.len());
    &items[start..end]
}
