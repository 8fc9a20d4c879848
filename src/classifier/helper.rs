//! Classification orchestration.

use super::preprocess::{CropRect, load_image, prepare_image};
use super::{ClassifierOptions, ImageClassifier, rank_categories};
use crate::models::{Category, ClassificationResult, Classifications};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Instant;

/// Receives classification results through callbacks.
pub trait ClassifierListener: Send + Sync {
    /// Called when classification fails.
    fn on_error(&self, error: &Error);

    /// Called with the ranked categories of a successful run.
    fn on_results(&self, outcome: &ClassificationOutcome);
}

/// The result of classifying one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationOutcome {
    /// Reference the image was loaded from.
    pub image_uri: String,
    /// Ranked categories and timing.
    pub classifications: Classifications,
}

impl ClassificationOutcome {
    /// The highest-confidence category, if any passed the threshold.
    #[must_use]
    pub fn top(&self) -> Option<&Category> {
        self.classifications.top()
    }

    /// Builds an unsaved history record from the top category.
    #[must_use]
    pub fn to_record(&self, now_ms: i64) -> Option<ClassificationResult> {
        let top = self.top()?;
        ClassificationResult::new(now_ms, self.image_uri.clone(), top.label.clone(), top.score).ok()
    }
}

/// Runs the classification pipeline for image references.
///
/// Wraps an [`ImageClassifier`] with the decode, resize, and ranking steps
/// around it. The helper is cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct ImageClassifierHelper {
    classifier: Arc<dyn ImageClassifier>,
    options: ClassifierOptions,
}

impl ImageClassifierHelper {
    /// Creates a helper around a classifier.
    #[must_use]
    pub fn new<C: ImageClassifier + 'static>(classifier: C, options: ClassifierOptions) -> Self {
        Self::from_shared(Arc::new(classifier), options)
    }

    /// Creates a helper around an already shared classifier.
    #[must_use]
    pub fn from_shared(classifier: Arc<dyn ImageClassifier>, options: ClassifierOptions) -> Self {
        Self {
            classifier,
            options,
        }
    }

    /// Returns the options in use.
    #[must_use]
    pub const fn options(&self) -> &ClassifierOptions {
        &self.options
    }

    /// Classifies the image at `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageDecode`] if the image cannot be read or decoded,
    /// or [`Error::ModelUnavailable`] if the model cannot run.
    pub fn classify_static_image(&self, reference: &str) -> Result<ClassificationOutcome> {
        self.classify_with_crop(reference, None)
    }

    /// Classifies a region of the image at `reference`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::classify_static_image`], plus [`Error::InvalidInput`]
    /// if the crop falls outside the image.
    pub fn classify_with_crop(
        &self,
        reference: &str,
        crop: Option<CropRect>,
    ) -> Result<ClassificationOutcome> {
        let bytes = load_image(reference)?;
        let classifications = self.classify_bytes(&bytes, crop)?;
        Ok(ClassificationOutcome {
            image_uri: reference.to_string(),
            classifications,
        })
    }

    /// Classifies already loaded image bytes.
    ///
    /// # Errors
    ///
    /// See [`Self::classify_with_crop`].
    pub fn classify_bytes(&self, bytes: &[u8], crop: Option<CropRect>) -> Result<Classifications> {
        self.options.validate()?;
        let image = prepare_image(bytes, crop, self.options.input_size)?;

        let start = Instant::now();
        let scores = self.classifier.classify(&image).inspect_err(|e| {
            metrics::counter!("classification_total", "status" => "error").increment(1);
            tracing::error!(backend = self.classifier.name(), error = %e, "Classification failed");
        })?;
        let inference_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let categories = rank_categories(
            &scores,
            &self.options.labels,
            self.options.threshold,
            self.options.max_results,
        );

        metrics::counter!("classification_total", "status" => "success").increment(1);
        tracing::debug!(
            backend = self.classifier.name(),
            inference_time_ms,
            categories = categories.len(),
            "Classification complete"
        );

        Ok(Classifications {
            categories,
            inference_time_ms,
        })
    }

    /// Classifies the image at `reference` and reports through `listener`.
    pub fn classify_with_listener(&self, reference: &str, listener: &dyn ClassifierListener) {
        match self.classify_static_image(reference) {
            Ok(outcome) => listener.on_results(&outcome),
            Err(e) => listener.on_error(&e),
        }
    }
}
