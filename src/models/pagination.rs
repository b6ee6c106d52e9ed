//! Pagination types shared by the listings

use serde::{Deserialize, Serialize};

/// Pagination parameters for list queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl ListParams {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.per_page as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Number of pages needed for `total` items. An empty listing still has one page.
pub fn page_count(total: i64, per_page: u32) -> u32 {
    let per_page = per_page.max(1) as i64;
    let pages = (total.max(0) + per_page - 1) / per_page;
    pages.max(1) as u32
}

/// Why a requested page cannot be served
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPage {
    #[error("Page is not a number: {0}")]
    NotANumber(String),
    #[error("Page {requested} is out of range (1..={last})")]
    OutOfRange { requested: i64, last: u32 },
}

/// Parse the `page` query value against the number of available pages.
///
/// A missing value means the first page. The first page is always valid,
/// even when the listing is empty.
pub fn resolve_page(raw: Option<&str>, total: i64, per_page: u32) -> Result<u32, InvalidPage> {
    let last = page_count(total, per_page);
    let requested = match raw.map(str::trim) {
        None | Some("") => return Ok(1),
        Some("last") => return Ok(last),
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| InvalidPage::NotANumber(value.to_string()))?,
    };

    if requested < 1 || requested > last as i64 {
        return Err(InvalidPage::OutOfRange { requested, last });
    }
    Ok(requested as u32)
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    pub fn total_pages(&self) -> u32 {
        page_count(self.total, self.per_page)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Page navigation data for templates
    pub fn page_info(&self) -> PageInfo {
        let num_pages = self.total_pages();
        PageInfo {
            number: self.page,
            num_pages,
            count: self.total,
            has_next: self.has_next(),
            has_previous: self.has_prev(),
            next_page_number: self.has_next().then(|| self.page + 1),
            previous_page_number: self.has_prev().then(|| self.page - 1),
            page_range: (1..=num_pages).collect(),
        }
    }
}

/// Page navigation exposed to templates as `page_obj`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageInfo {
    pub number: u32,
    pub num_pages: u32,
    pub count: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<u32>,
    pub previous_page_number: Option<u32>,
    pub page_range: Vec<u32>,
}
