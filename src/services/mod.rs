//! Observable single-shot services.
//!
//! Each service runs one blocking unit of work on the blocking pool and
//! publishes the latest state through a `tokio::sync::watch` holder. There
//! is no cancellation, timeout, or retry; a call either completes and
//! publishes once or fails and leaves the holder as it was.

mod container;
mod history;
mod news_feed;
mod result;

pub use container::ServiceContainer;
pub use history::HistoryService;
pub use news_feed::NewsFeed;
pub use result::ResultService;

use crate::{Error, Result};

/// Runs blocking work on the tokio blocking pool.
async fn run_blocking<T, F>(operation: &'static str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::OperationFailed {
            operation: operation.to_string(),
            cause: format!("spawn_blocking join error: {e}"),
        })?
}
