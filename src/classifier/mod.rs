//! Image classification.
//!
//! The pipeline is linear: load the image reference, decode and resize it to
//! the model's input tensor, run the model, then rank the raw scores.
//! Inference itself is delegated to an [`ImageClassifier`] implementation;
//! [`OnnxClassifier`] runs ONNX models through `tract` when the `onnx`
//! feature is enabled.
//!
//! Ranking follows the inference library's contract: at most
//! `max_results` categories, each with a score of at least `threshold`,
//! highest confidence first.

mod helper;
mod onnx;
pub mod preprocess;

pub use helper::{ClassificationOutcome, ClassifierListener, ImageClassifierHelper};
pub use onnx::OnnxClassifier;
pub use preprocess::{CropRect, PreparedImage, load_image, prepare_image};

use crate::models::Category;
use crate::{Error, Result};
use std::path::PathBuf;

/// Default minimum confidence for a category to be reported.
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// Default number of categories to report.
pub const DEFAULT_MAX_RESULTS: usize = 2;

/// Default edge length of the square model input.
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Default model file name.
pub const DEFAULT_MODEL_FILE: &str = "cancer_classification.onnx";

/// Trait for inference backends.
///
/// Implementations return one raw score per label, in the model's output
/// order. Ranking and thresholding happen in [`rank_categories`].
pub trait ImageClassifier: Send + Sync {
    /// The backend name.
    fn name(&self) -> &'static str;

    /// Runs the model on a prepared image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelUnavailable`] if the model cannot be loaded or
    /// executed.
    fn classify(&self, image: &PreparedImage) -> Result<Vec<f32>>;
}

/// Options controlling model loading and result ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierOptions {
    /// Minimum score for a category to be reported.
    pub threshold: f32,
    /// Maximum number of categories to report (0 = no limit).
    pub max_results: usize,
    /// Edge length of the square input tensor.
    pub input_size: u32,
    /// Path to the model file.
    pub model_path: PathBuf,
    /// Labels in model output order.
    pub labels: Vec<String>,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_results: DEFAULT_MAX_RESULTS,
            input_size: DEFAULT_INPUT_SIZE,
            model_path: PathBuf::from(DEFAULT_MODEL_FILE),
            labels: vec!["Cancer".to_string(), "Non Cancer".to_string()],
        }
    }
}

impl ClassifierOptions {
    /// Sets the score threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the maximum number of results.
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Sets the model path.
    #[must_use]
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    /// Sets the labels.
    #[must_use]
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the threshold is not within
    /// `[0, 1]` or the input size is zero.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::InvalidInput(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        if self.input_size == 0 {
            return Err(Error::InvalidInput(
                "input size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Ranks raw model scores into reported categories.
///
/// Keeps scores `>= threshold` (NaN never passes), sorts them by descending
/// score with ties kept in model order, and truncates to `max_results`
/// (`0` keeps everything). Labels missing from `labels` fall back to the
/// output index.
#[must_use]
pub fn rank_categories(
    scores: &[f32],
    labels: &[String],
    threshold: f32,
    max_results: usize,
) -> Vec<Category> {
    let mut categories: Vec<Category> = scores
        .iter()
        .enumerate()
        .filter(|(_, score)| **score >= threshold)
        .map(|(index, score)| Category {
            index,
            label: labels
                .get(index)
                .cloned()
                .unwrap_or_else(|| index.to_string()),
            score: *score,
        })
        .collect();

    categories.sort_by(|a, b| b.score.total_cmp(&a.score));

    if max_results > 0 {
        categories.truncate(max_results);
    }
    categories
}

/// Converts raw model output into probabilities.
///
/// Outputs that already lie in `[0, 1]` are returned unchanged; anything
/// else (logits) goes through a numerically stable softmax.
#[must_use]
pub fn to_probabilities(raw: &[f32]) -> Vec<f32> {
    if raw.iter().all(|v| (0.0..=1.0).contains(v)) {
        return raw.to_vec();
    }

    let max = raw.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = raw.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return vec![0.0; raw.len()];
    }
    exps.into_iter().map(|v| v / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["Cancer".to_string(), "Non Cancer".to_string()]
    }

    #[test]
    fn test_rank_orders_descending() {
        let ranked = rank_categories(&[0.27, 0.73], &labels(), 0.1, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].label, "Non Cancer");
        assert_eq!(ranked[0].index, 1);
        assert_eq!(ranked[1].label, "Cancer");
    }

    #[test]
    fn test_rank_applies_threshold() {
        let ranked = rank_categories(&[0.95, 0.05], &labels(), 0.1, 2);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].label, "Cancer");
    }

    #[test]
    fn test_rank_truncates_to_max_results() {
        let scores = [0.2, 0.5, 0.3];
        let ranked = rank_categories(&scores, &[], 0.0, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].label, "1");
        assert_eq!(ranked[1].label, "2");
    }

    #[test]
    fn test_rank_zero_max_results_is_unbounded() {
        let ranked = rank_categories(&[0.2, 0.5, 0.3], &[], 0.0, 0);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn test_rank_ignores_nan() {
        let ranked = rank_categories(&[f32::NAN, 0.4], &labels(), 0.1, 2);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].index, 1);
    }

    #[test]
    fn test_rank_ties_keep_model_order() {
        let ranked = rank_categories(&[0.5, 0.5], &labels(), 0.1, 2);
        assert_eq!(ranked[0].index, 0);
        assert_eq!(ranked[1].index, 1);
    }

    #[test]
    fn test_probabilities_passthrough() {
        assert_eq!(to_probabilities(&[0.2, 0.8]), vec![0.2, 0.8]);
    }

    #[test]
    fn test_probabilities_softmax_for_logits() {
        let probs = to_probabilities(&[2.0, -1.0]);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(probs[0] > probs[1]);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_options_validate() {
        assert!(ClassifierOptions::default().validate().is_ok());
        assert!(
            ClassifierOptions::default()
                .with_threshold(1.5)
                .validate()
                .is_err()
        );
        let zero = ClassifierOptions {
            input_size: 0,
            ..ClassifierOptions::default()
        };
        assert!(zero.validate().is_err());
    }
}
