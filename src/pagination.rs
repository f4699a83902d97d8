//! Page-number handling for post listings.
//!
//! The rules match the classic "get_page" behaviour: a missing or non-numeric
//! page parameter means page 1, and any numeric page outside the valid range
//! (below 1 or past the end) resolves to the last page. A listing with no
//! items still has one empty page.

use std::num::IntErrorKind;

/// Posts shown on one feed page.
pub const POSTS_PER_PAGE: usize = 12;

/// One resolved page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_other_pages(&self) -> bool {
        self.total_pages > 1
    }

    pub fn previous_page_number(&self) -> usize {
        self.current_page.saturating_sub(1).max(1)
    }

    pub fn next_page_number(&self) -> usize {
        (self.current_page + 1).min(self.total_pages)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A window into `total_count` items: which page, and where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub current_page: usize,
    pub total_pages: usize,
    pub offset: usize,
    pub limit: usize,
}

impl Window {
    /// Resolve the raw `page` query value against a known item count.
    pub fn resolve(raw_page: Option<&str>, total_count: usize, per_page: usize) -> Self {
        let total_pages = total_count.div_ceil(per_page).max(1);

        let current_page = match raw_page.map(str::trim).map(str::parse::<i64>) {
            Some(Ok(n)) if n >= 1 && (n as u64) <= total_pages as u64 => n as usize,
            Some(Ok(_)) => total_pages,
            // still a number, just too large to represent
            Some(Err(e))
                if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) =>
            {
                total_pages
            }
            None | Some(Err(_)) => 1,
        };

        Self {
            current_page,
            total_pages,
            offset: (current_page - 1) * per_page,
            limit: per_page,
        }
    }

    pub fn into_page<T>(self, items: Vec<T>, total_count: usize) -> Page<T> {
        Page {
            items,
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_for(raw: Option<&str>, count: usize) -> usize {
        Window::resolve(raw, count, POSTS_PER_PAGE).current_page
    }

    #[test]
    fn missing_or_garbage_page_is_first() {
        assert_eq!(page_for(None, 30), 1);
        assert_eq!(page_for(Some("abc"), 30), 1);
        assert_eq!(page_for(Some(""), 30), 1);
        assert_eq!(page_for(Some("2.5"), 30), 1);
    }

    #[test]
    fn out_of_range_page_is_last() {
        assert_eq!(page_for(Some("3"), 30), 3);
        assert_eq!(page_for(Some("8"), 30), 3);
        assert_eq!(page_for(Some("0"), 30), 3);
        assert_eq!(page_for(Some("-4"), 30), 3);
        assert_eq!(page_for(Some("99999999999999999999"), 30), 3);
    }

    #[test]
    fn empty_listing_has_one_page() {
        let window = Window::resolve(Some("5"), 0, POSTS_PER_PAGE);
        assert_eq!(window.current_page, 1);
        assert_eq!(window.total_pages, 1);
        assert_eq!(window.offset, 0);
    }

    #[test]
    fn offsets_follow_page_size() {
        let window = Window::resolve(Some("2"), 13, POSTS_PER_PAGE);
        assert_eq!(window.total_pages, 2);
        assert_eq!(window.offset, 12);
        assert_eq!(window.limit, 12);

        let exact = Window::resolve(None, 24, POSTS_PER_PAGE);
        assert_eq!(exact.total_pages, 2);
    }

    #[test]
    fn page_navigation_helpers() {
        let page = Window::resolve(Some("2"), 40, POSTS_PER_PAGE).into_page(vec![1, 2], 40);
        assert!(page.has_previous());
        assert!(page.has_next());
        assert!(page.has_other_pages());
        assert_eq!(page.previous_page_number(), 1);
        assert_eq!(page.next_page_number(), 3);
        assert_eq!(page.len(), 2);
    }
}
