//! News API wire types and the display item derived from them.

use serde::{Deserialize, Serialize};

/// Envelope returned by the `top-headlines` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    /// Status reported by the API (`"ok"` or `"error"`).
    pub status: String,
    /// Total number of matching articles on the server.
    #[serde(default)]
    pub total_results: u32,
    /// Articles in this page.
    #[serde(default)]
    pub articles: Vec<Article>,
}

/// A single article as sent by the news API.
///
/// Every string field except the source name may be missing or `null`;
/// incomplete articles are filtered out when mapped to [`NewsItem`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Publisher of the article.
    pub source: Source,
    /// Author, if known.
    #[serde(default)]
    pub author: Option<String>,
    /// Headline.
    #[serde(default)]
    pub title: Option<String>,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
    /// Link to the full article.
    #[serde(default)]
    pub url: Option<String>,
    /// Link to the article's image.
    #[serde(default)]
    pub url_to_image: Option<String>,
    /// Publication time, `yyyy-MM-ddTHH:mm:ssZ`.
    #[serde(default)]
    pub published_at: Option<String>,
    /// Truncated article body.
    #[serde(default)]
    pub content: Option<String>,
}

/// Publisher of an article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Publisher identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Publisher display name.
    pub name: String,
}

/// A headline ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Headline.
    pub title: String,
    /// Link to the headline image.
    pub image_url: String,
    /// Link to the full article.
    pub url: Option<String>,
}

impl NewsItem {
    /// Builds a display item from an article.
    ///
    /// Returns `None` when the title, image link, or article link is missing
    /// or empty.
    #[must_use]
    pub fn from_article(article: &Article) -> Option<Self> {
        let title = non_empty(article.title.as_deref())?;
        let image_url = non_empty(article.url_to_image.as_deref())?;
        let url = non_empty(article.url.as_deref())?;
        Some(Self {
            title: title.to_string(),
            image_url: image_url.to_string(),
            url: Some(url.to_string()),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: Option<&str>, image: Option<&str>, url: Option<&str>) -> Article {
        Article {
            source: Source {
                id: None,
                name: "Example".to_string(),
            },
            title: title.map(str::to_string),
            url_to_image: image.map(str::to_string),
            url: url.map(str::to_string),
            ..Article::default()
        }
    }

    #[test]
    fn test_from_article_complete() {
        let item = NewsItem::from_article(&article(
            Some("Screening saves lives"),
            Some("https://img.example/a.png"),
            Some("https://news.example/a"),
        ))
        .unwrap();
        assert_eq!(item.title, "Screening saves lives");
        assert_eq!(item.image_url, "https://img.example/a.png");
        assert_eq!(item.url.as_deref(), Some("https://news.example/a"));
    }

    #[test]
    fn test_from_article_drops_incomplete() {
        assert!(NewsItem::from_article(&article(None, Some("i"), Some("u"))).is_none());
        assert!(NewsItem::from_article(&article(Some(""), Some("i"), Some("u"))).is_none());
        assert!(NewsItem::from_article(&article(Some("t"), None, Some("u"))).is_none());
        assert!(NewsItem::from_article(&article(Some("t"), Some(""), Some("u"))).is_none());
        assert!(NewsItem::from_article(&article(Some("t"), Some("i"), None)).is_none());
        assert!(NewsItem::from_article(&article(Some("t"), Some("i"), Some(""))).is_none());
    }

    #[test]
    fn test_response_deserializes_with_nulls() {
        let json = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {
                    "source": {"id": null, "name": "Health Daily"},
                    "author": null,
                    "title": "New therapy approved",
                    "description": null,
                    "url": "https://news.example/therapy",
                    "urlToImage": null,
                    "publishedAt": "2024-05-01T10:00:00Z",
                    "content": null
                },
                {
                    "source": {"id": "wire", "name": "Wire"},
                    "title": "Trial results",
                    "url": "https://news.example/trial",
                    "urlToImage": "https://img.example/trial.jpg",
                    "publishedAt": "2024-05-02T08:30:00Z"
                }
            ]
        }"#;

        let response: NewsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, "ok");
        assert_eq!(response.total_results, 2);
        assert_eq!(response.articles.len(), 2);
        assert!(response.articles[0].url_to_image.is_none());
        assert_eq!(response.articles[1].source.id.as_deref(), Some("wire"));
    }

    #[test]
    fn test_response_without_articles() {
        let response: NewsResponse = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert!(response.articles.is_empty());
        assert_eq!(response.total_results, 0);
    }
}
