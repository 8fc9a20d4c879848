//! # Asclepius
//!
//! On-device cancer image classification with a local history of results and
//! a health-news feed.
//!
//! Asclepius decodes a photo, resizes it to the model's input tensor, runs a
//! pre-trained classifier, and reports the highest-confidence label. Results
//! can be saved to a local `SQLite` record store and browsed later. A separate
//! flow fetches cancer-related health headlines from a news API.
//!
//! ## Features
//!
//! - Single-binary CLI (`asclepius classify|history|news|status|config`)
//! - ONNX inference through `tract` (feature `onnx`, enabled by default)
//! - Ranked, thresholded predictions (top-N, descending confidence)
//! - Insert-or-replace history store, newest first
//! - One-shot news fetch with incomplete articles filtered out
//!
//! ## Example
//!
//! ```rust,ignore
//! use asclepius::classifier::{ClassifierOptions, ImageClassifierHelper, OnnxClassifier};
//!
//! let options = ClassifierOptions::default();
//! let helper = ImageClassifierHelper::new(OnnxClassifier::new(&options), options);
//! let outcome = helper.classify_static_image("skin.jpg")?;
//! if let Some(top) = outcome.top() {
//!     println!("{} {}", top.label, top.score);
//! }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// tract pulls in several versions of the same transitive crates.
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod classifier;
pub mod cli;
pub mod config;
pub mod models;
pub mod news;
pub mod observability;
pub mod rendering;
pub mod services;
pub mod storage;

pub use classifier::{
    ClassificationOutcome, ClassifierOptions, ImageClassifier, ImageClassifierHelper,
};
pub use config::AsclepiusConfig;
pub use models::{Category, ClassificationResult, Classifications, NewsItem, ResultId};
pub use news::{NewsApiClient, NewsQuery, NewsRepository};
pub use services::{HistoryService, NewsFeed, ResultService, ServiceContainer};
pub use storage::{ResultStore, SqliteResultStore};

/// Error type for asclepius operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Score outside `[0, 1]`, malformed crop rectangle, bad CLI value |
/// | `OperationFailed` | `SQLite` queries fail, config files cannot be read, I/O errors |
/// | `ModelUnavailable` | The classification model cannot be loaded or executed |
/// | `ImageDecode` | The image reference cannot be read or decoded |
/// | `NewsFetch` | News API transport failure or non-success HTTP status |
/// | `FeatureNotEnabled` | Classification requested without the `onnx` feature |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - `SQLite` database operations fail
    /// - Filesystem I/O errors occur
    /// - Configuration files cannot be parsed
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// The image classifier could not be initialized or run.
    ///
    /// Classification is aborted and no results are produced.
    #[error("image classifier failed: {0}")]
    ModelUnavailable(String),

    /// The image could not be read or decoded.
    ///
    /// The caller receives no image and the classifier is never invoked.
    #[error("failed to decode image: {0}")]
    ImageDecode(String),

    /// The news feed could not be fetched.
    ///
    /// Transport failures and non-success statuses share this variant.
    #[error("news fetch failed: {0}")]
    NewsFetch(String),

    /// Feature not enabled (requires feature flag).
    #[error("feature not enabled: {0} (compile with --features {0})")]
    FeatureNotEnabled(String),
}

/// Result type alias for asclepius operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in milliseconds.
///
/// Falls back to 0 if the system clock is before the Unix epoch.
///
/// # Examples
///
/// ```rust
/// use asclepius::current_timestamp_millis;
///
/// let ts = current_timestamp_millis();
/// assert!(ts > 0);
/// ```
#[must_use]
pub fn current_timestamp_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
