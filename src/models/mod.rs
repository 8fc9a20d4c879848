//! Data models for asclepius.
//!
//! - [`classification`]: classification results and the ranked categories
//!   produced by the model.
//! - [`news`]: news API wire types and the filtered [`NewsItem`] list.

mod classification;
mod news;

pub use classification::{CANCER_LABEL, Category, ClassificationResult, Classifications, ResultId};
pub use news::{Article, NewsItem, NewsResponse, Source};

pub(crate) use classification::validate_score;
