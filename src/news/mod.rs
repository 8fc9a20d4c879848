//! Health-news feed.
//!
//! A single GET against the news API's `top-headlines` endpoint with a fixed
//! query, mapped to [`NewsItem`]s with incomplete articles dropped. There is
//! no retry, paging, or caching.

mod client;
mod repository;

pub use client::{NewsApiClient, NewsHttpConfig, build_http_client};
pub use repository::{NewsRepository, NewsSource};

use crate::models::{NewsItem, NewsResponse};

/// Default news API base URL.
pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/";

/// Message reported when the API answers with a non-success status.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch news";

/// Query parameters sent to `top-headlines`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    /// Search keyword (`q`).
    pub query: String,
    /// News category.
    pub category: String,
    /// Two-letter language code.
    pub language: String,
}

impl Default for NewsQuery {
    fn default() -> Self {
        Self {
            query: "cancer".to_string(),
            category: "health".to_string(),
            language: "en".to_string(),
        }
    }
}

/// Maps an API response to display items.
///
/// Articles without a title, image link, or article link are dropped; the
/// relative order of the rest is kept.
#[must_use]
pub fn to_news_items(response: &NewsResponse) -> Vec<NewsItem> {
    response
        .articles
        .iter()
        .filter_map(NewsItem::from_article)
        .collect()
}
