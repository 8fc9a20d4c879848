//! Classification result types.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label the model uses for a positive finding.
pub const CANCER_LABEL: &str = "Cancer";

/// Identifier of a stored classification result.
///
/// Assigned by the record store on first insert and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultId(i64);

impl ResultId {
    /// Creates a result ID from its raw value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw row identifier.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ResultId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for ResultId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| Error::InvalidInput(format!("'{s}' is not a valid result id")))
    }
}

/// A classification result as stored in the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Row identifier; `None` until the record has been inserted.
    pub id: Option<ResultId>,
    /// Capture time (Unix epoch milliseconds).
    pub timestamp: i64,
    /// Reference to the source image (opaque URI or path).
    pub image_uri: String,
    /// Predicted label.
    pub label: String,
    /// Confidence of the predicted label, in `[0, 1]`.
    pub score: f32,
}

impl ClassificationResult {
    /// Creates a new, not yet stored, classification result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `score` is NaN or outside `[0, 1]`.
    pub fn new(
        timestamp: i64,
        image_uri: impl Into<String>,
        label: impl Into<String>,
        score: f32,
    ) -> Result<Self> {
        validate_score(score)?;
        Ok(Self {
            id: None,
            timestamp,
            image_uri: image_uri.into(),
            label: label.into(),
            score,
        })
    }

    /// Returns a copy of this record carrying the given identifier.
    #[must_use]
    pub fn with_id(mut self, id: ResultId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Checks that a score is a probability.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for NaN or values outside `[0, 1]`.
pub(crate) fn validate_score(score: f32) -> Result<()> {
    if (0.0..=1.0).contains(&score) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "score must be within [0, 1], got {score}"
        )))
    }
}

/// A single label/confidence pair produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Position of the label in the model's output vector.
    pub index: usize,
    /// Human-readable label.
    pub label: String,
    /// Confidence in `[0, 1]`.
    pub score: f32,
}

/// Ranked categories for one classification run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classifications {
    /// Categories that passed the threshold, highest confidence first.
    pub categories: Vec<Category>,
    /// Wall-clock inference time in milliseconds.
    pub inference_time_ms: u64,
}

impl Classifications {
    /// Returns the highest-confidence category, if any passed the threshold.
    #[must_use]
    pub fn top(&self) -> Option<&Category> {
        self.categories.first()
    }

    /// Whether no category passed the threshold.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
