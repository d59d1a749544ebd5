//! Page-window arithmetic.
//!
//! Caller input is never rejected: out-of-range values are clamped and
//! unusable ones fall back to defaults.

use serde::Serialize;

use esmcp_core::IndexDescriptor;

/// Page used when the caller gives none.
pub const DEFAULT_PAGE: usize = 1;

/// A sanitized page request. `page >= 1` and `page_size > 0` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    /// Build from signed caller input. A non-positive page clamps to 1; a
    /// missing or non-positive page size falls back to `default_page_size`.
    pub fn from_raw(page: Option<i64>, page_size: Option<i64>, default_page_size: usize) -> Self {
        let page = match page {
            Some(p) if p > 0 => p as usize,
            _ => DEFAULT_PAGE,
        };
        Self {
            page,
            page_size: positive_or(page_size, default_page_size),
        }
    }

    /// Build from textual parameters, e.g. a URI query string. Each value
    /// falls back to its default independently when missing, non-numeric or
    /// non-positive.
    pub fn from_text(page: Option<&str>, page_size: Option<&str>, default_page_size: usize) -> Self {
        let parse = |value: Option<&str>| value.and_then(|v| v.trim().parse::<i64>().ok());
        Self::from_raw(parse(page), parse(page_size), default_page_size)
    }

    /// Resolve against a collection of `total` items.
    pub fn window(&self, total: usize) -> PageWindow {
        let total_pages = total.div_ceil(self.page_size);
        let current_page = if total_pages == 0 {
            DEFAULT_PAGE
        } else {
            self.page.clamp(1, total_pages)
        };
        let start = ((current_page - 1) * self.page_size).min(total);
        let end = (start + self.page_size).min(total);

        PageWindow {
            total_items: total,
            total_pages,
            current_page,
            page_size: self.page_size,
            start,
            end,
        }
    }
}

fn positive_or(value: Option<i64>, default: usize) -> usize {
    match value {
        Some(v) if v > 0 => v as usize,
        _ => default.max(1),
    }
}

/// The resolved slice `[start, end)` of an ordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub total_items: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One page of the index catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexPage {
    pub total_indices: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
    pub indices_on_page: usize,
    pub indices: Vec<IndexDescriptor>,
}

/// Sort the catalog by name and cut out the requested page.
pub fn paginate_indices(mut indices: Vec<IndexDescriptor>, request: PageRequest) -> IndexPage {
    indices.sort_by(|a, b| a.index.cmp(&b.index));

    let window = request.window(indices.len());
    let page: Vec<IndexDescriptor> = indices.drain(window.start..window.end).collect();

    IndexPage {
        total_indices: window.total_items,
        total_pages: window.total_pages,
        current_page: window.current_page,
        page_size: window.page_size,
        indices_on_page: page.len(),
        indices: page,
    }
}
