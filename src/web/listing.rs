//! News listing pages
//!
//! The home page and the category pages share one listing: a page of
//! published news, its navigation and the category sidebar.

use serde::Serialize;

use crate::models::{Category, CategoryWithCount, NewsWithCategory, PageInfo, PagedResult};

pub const HOME_TITLE: &str = "News";

/// Extra value shown by every listing, displayed uppercased
pub const LISTING_EXTRA: &str = "hello world";

/// Template context of a listing page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Listing {
    pub title: String,
    pub mixin_prop: String,
    pub news: Vec<NewsWithCategory>,
    pub page_obj: PageInfo,
    pub is_paginated: bool,
    pub categories: Vec<CategoryWithCount>,
    /// Id of the category being browsed, 0 on the home page
    pub current_category_id: i64,
}

/// Uppercase the listing extra
pub fn mixin_prop(extra: &str) -> String {
    extra.to_uppercase()
}

/// Assemble a listing from one page of news.
///
/// `category` is the category being browsed; `None` means the home page.
pub fn compose_listing(
    page: PagedResult<NewsWithCategory>,
    category: Option<&Category>,
    sidebar: Vec<CategoryWithCount>,
) -> Listing {
    let page_obj = page.page_info();
    Listing {
        title: category
            .map(|c| c.name.clone())
            .unwrap_or_else(|| HOME_TITLE.to_string()),
        mixin_prop: mixin_prop(LISTING_EXTRA),
        is_paginated: page_obj.num_pages > 1,
        page_obj,
        news: page.items,
        categories: sidebar,
        current_category_id: category.map_or(0, |c| c.id),
    }
}
