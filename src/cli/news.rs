//! News CLI command.

#![allow(clippy::print_stdout)]

use crate::Result;
use crate::config::AsclepiusConfig;
use crate::rendering::{OutputFormat, render_news};
use crate::services::ServiceContainer;

/// News command.
///
/// # Errors
///
/// Returns [`crate::Error::NewsFetch`] if the headlines cannot be fetched.
pub async fn cmd_news(config: AsclepiusConfig, format: OutputFormat) -> Result<()> {
    if config.news.api_key.is_empty() {
        tracing::warn!("NEWS_API_KEY is not set; the news API will likely reject the request");
    }

    let feed = ServiceContainer::from_config(config).news_feed();
    let items = feed.fetch_health_news().await?;
    print!("{}", render_news(&items, format)?);
    Ok(())
}
