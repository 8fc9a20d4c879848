//! Health-news feed state.

use super::run_blocking;
use crate::models::NewsItem;
use crate::news::NewsSource;
use crate::{Error, Result};
use std::sync::Arc;
use tokio::sync::watch;

/// Observable health-news list with a loading flag.
///
/// A failed fetch clears the loading flag, records the error message, and
/// leaves the list as it was.
pub struct NewsFeed {
    source: Arc<dyn NewsSource>,
    news_list: watch::Sender<Vec<NewsItem>>,
    is_loading: watch::Sender<bool>,
    last_error: watch::Sender<Option<String>>,
}

impl NewsFeed {
    /// Creates a feed over `source`.
    #[must_use]
    pub fn new(source: Arc<dyn NewsSource>) -> Self {
        let (news_list, _) = watch::channel(Vec::new());
        let (is_loading, _) = watch::channel(false);
        let (last_error, _) = watch::channel(None);
        Self {
            source,
            news_list,
            is_loading,
            last_error,
        }
    }

    /// Subscribes to the news list.
    #[must_use]
    pub fn news_list(&self) -> watch::Receiver<Vec<NewsItem>> {
        self.news_list.subscribe()
    }

    /// Subscribes to the loading flag.
    #[must_use]
    pub fn is_loading(&self) -> watch::Receiver<bool> {
        self.is_loading.subscribe()
    }

    /// Message of the most recent failed fetch, cleared on success.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.last_error.borrow().clone()
    }

    /// Fetches the headlines once and publishes them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NewsFetch`] if the fetch fails.
    pub async fn fetch_health_news(&self) -> Result<Vec<NewsItem>> {
        self.is_loading.send_replace(true);

        let source = Arc::clone(&self.source);
        let result = run_blocking("fetch_health_news", move || source.get_health_news()).await;

        self.is_loading.send_replace(false);
        match result {
            Ok(items) => {
                self.news_list.send_replace(items.clone());
                self.last_error.send_replace(None);
                Ok(items)
            },
            Err(e) => {
                let message = match &e {
                    Error::NewsFetch(message) => message.clone(),
                    other => other.to_string(),
                };
                tracing::warn!(error = %message, "Health news fetch failed");
                self.last_error.send_replace(Some(message));
                Err(e)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replays canned responses in order.
    struct ScriptedSource(Mutex<Vec<Result<Vec<NewsItem>>>>);

    impl NewsSource for ScriptedSource {
        fn get_health_news(&self) -> Result<Vec<NewsItem>> {
            self.0.lock().unwrap().remove(0)
        }
    }

    fn item(title: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            image_url: "https://img.example/x.jpg".to_string(),
            url: Some("https://news.example/x".to_string()),
        }
    }

    fn feed(script: Vec<Result<Vec<NewsItem>>>) -> NewsFeed {
        NewsFeed::new(Arc::new(ScriptedSource(Mutex::new(script))))
    }

    #[tokio::test]
    async fn test_success_publishes_list() {
        let feed = feed(vec![Ok(vec![item("a"), item("b")])]);
        let items = feed.fetch_health_news().await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(feed.news_list().borrow().len(), 2);
        assert!(!*feed.is_loading().borrow());
        assert!(feed.last_error().is_none());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_list() {
        let feed = feed(vec![
            Ok(vec![item("kept")]),
            Err(Error::NewsFetch("Failed to fetch news".to_string())),
        ]);

        feed.fetch_health_news().await.unwrap();
        let err = feed.fetch_health_news().await.unwrap_err();

        assert!(matches!(err, Error::NewsFetch(_)));
        assert_eq!(feed.news_list().borrow()[0].title, "kept");
        assert!(!*feed.is_loading().borrow());
        assert_eq!(feed.last_error().as_deref(), Some("Failed to fetch news"));
    }

    #[tokio::test]
    async fn test_error_cleared_after_success() {
        let feed = feed(vec![
            Err(Error::NewsFetch("connection refused".to_string())),
            Ok(Vec::new()),
        ]);

        assert!(feed.fetch_health_news().await.is_err());
        assert!(feed.last_error().is_some());
        assert!(feed.fetch_health_news().await.unwrap().is_empty());
        assert!(feed.last_error().is_none());
    }
}
