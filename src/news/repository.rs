//! News repository.

use super::{NewsApiClient, NewsQuery, to_news_items};
use crate::Result;
use crate::models::NewsItem;

/// Source of health headlines.
///
/// Implementations block; callers on an async runtime should run them with
/// `spawn_blocking`.
pub trait NewsSource: Send + Sync {
    /// Fetches the current health headlines.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NewsFetch`] if the headlines cannot be fetched.
    fn get_health_news(&self) -> Result<Vec<NewsItem>>;
}

/// Fetches and filters health headlines from the news API.
#[derive(Debug, Clone)]
pub struct NewsRepository {
    client: NewsApiClient,
    query: NewsQuery,
}

impl NewsRepository {
    /// Creates a repository using the default cancer/health/en query.
    #[must_use]
    pub fn new(client: NewsApiClient) -> Self {
        Self {
            client,
            query: NewsQuery::default(),
        }
    }

    /// Replaces the query.
    #[must_use]
    pub fn with_query(mut self, query: NewsQuery) -> Self {
        self.query = query;
        self
    }

    /// The query sent on each fetch.
    #[must_use]
    pub const fn query(&self) -> &NewsQuery {
        &self.query
    }

    /// The underlying API client.
    #[must_use]
    pub const fn client(&self) -> &NewsApiClient {
        &self.client
    }
}

impl NewsSource for NewsRepository {
    fn get_health_news(&self) -> Result<Vec<NewsItem>> {
        let response = self.client.search_health_news(&self.query)?;
        let items = to_news_items(&response);
        tracing::info!(
            received = response.articles.len(),
            kept = items.len(),
            "Health news loaded"
        );
        Ok(items)
    }
}
