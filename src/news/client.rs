//! Blocking HTTP client for the news API.

use super::{DEFAULT_BASE_URL, FETCH_FAILED_MESSAGE, NewsQuery};
use crate::models::NewsResponse;
use crate::{Error, Result};
use std::time::Duration;

/// HTTP client configuration for the news API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsHttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for NewsHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
        }
    }
}

/// Builds a blocking HTTP client with the configured timeouts.
#[must_use]
pub fn build_http_client(config: NewsHttpConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder();
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build news HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}

/// News API client.
///
/// The underlying blocking client is built per request, so a `NewsApiClient`
/// can be created and dropped on an async thread and only
/// [`Self::search_health_news`] has to run off the runtime.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    base_url: String,
    api_key: String,
    http: NewsHttpConfig,
}

impl NewsApiClient {
    /// Creates a client for `base_url`.
    ///
    /// An empty base URL falls back to [`DEFAULT_BASE_URL`].
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, http: NewsHttpConfig) -> Self {
        let base_url = base_url.into();
        let base_url = if base_url.trim().is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            base_url
        };
        Self {
            base_url,
            api_key: api_key.into(),
            http,
        }
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn endpoint(&self) -> String {
        format!("{}/top-headlines", self.base_url.trim_end_matches('/'))
    }

    /// Fetches the `top-headlines` page for `query`.
    ///
    /// Blocks the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NewsFetch`] with the transport error text if the
    /// request cannot be completed, `"Failed to fetch news"` if the API
    /// answers with a non-success status, or the decode error if the body is
    /// not a valid response.
    pub fn search_health_news(&self, query: &NewsQuery) -> Result<NewsResponse> {
        let endpoint = self.endpoint();
        tracing::debug!(
            endpoint = %endpoint,
            q = %query.query,
            category = %query.category,
            language = %query.language,
            "Fetching health news"
        );

        let client = build_http_client(self.http);
        let response = client
            .get(&endpoint)
            .query(&[
                ("q", query.query.as_str()),
                ("category", query.category.as_str()),
                ("language", query.language.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .map_err(|e| {
                metrics::counter!("news_fetch_total", "status" => "transport_error").increment(1);
                tracing::warn!(error = %e, "News request failed");
                Error::NewsFetch(non_empty_message(e.to_string()))
            })?;

        let status = response.status();
        if !status.is_success() {
            metrics::counter!("news_fetch_total", "status" => "http_error").increment(1);
            tracing::warn!(status = status.as_u16(), "News API returned an error status");
            return Err(Error::NewsFetch(FETCH_FAILED_MESSAGE.to_string()));
        }

        let body: NewsResponse = response.json().map_err(|e| {
            metrics::counter!("news_fetch_total", "status" => "decode_error").increment(1);
            tracing::warn!(error = %e, "News response could not be decoded");
            Error::NewsFetch(non_empty_message(e.to_string()))
        })?;

        metrics::counter!("news_fetch_total", "status" => "success").increment(1);
        tracing::debug!(articles = body.articles.len(), "News fetched");
        Ok(body)
    }
}

fn non_empty_message(message: String) -> String {
    if message.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_defaults() {
        let config = NewsHttpConfig::default();
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.connect_timeout_ms, 3_000);
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let with_slash = NewsApiClient::new("https://newsapi.org/v2/", "k", NewsHttpConfig::default());
        let without = NewsApiClient::new("https://newsapi.org/v2", "k", NewsHttpConfig::default());
        assert_eq!(with_slash.endpoint(), "https://newsapi.org/v2/top-headlines");
        assert_eq!(without.endpoint(), with_slash.endpoint());
    }

    #[test]
    fn test_empty_base_url_uses_default() {
        let client = NewsApiClient::new("  ", "", NewsHttpConfig::default());
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert!(!client.has_api_key());
    }

    #[test]
    fn test_unreachable_host_is_news_fetch_error() {
        // Port 9 on localhost is the discard service; nothing listens there in CI.
        let config = NewsHttpConfig {
            timeout_ms: 2_000,
            connect_timeout_ms: 500,
        };
        let client = NewsApiClient::new("http://127.0.0.1:9/v2/", "key", config);
        let err = client.search_health_news(&NewsQuery::default()).unwrap_err();
        match err {
            Error::NewsFetch(message) => assert!(!message.is_empty()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_empty_message() {
        assert_eq!(non_empty_message(String::new()), "Unknown error");
        assert_eq!(non_empty_message("boom".to_string()), "boom");
    }
}
