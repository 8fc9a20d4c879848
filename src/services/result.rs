//! Classify, then optionally save or delete.

use super::container::LazyStore;
use super::run_blocking;
use crate::classifier::{ClassificationOutcome, CropRect, ImageClassifierHelper};
use crate::models::{ClassificationResult, ResultId};
use crate::storage::{ResultStore, acquire_lock};
use crate::{Error, Result, current_timestamp_millis};
use std::sync::{Arc, Mutex};

/// Runs a classification and keeps its record until it is saved.
///
/// Classifying never touches the store; [`Self::save`] and [`Self::delete`]
/// open it on first use.
pub struct ResultService {
    helper: ImageClassifierHelper,
    store: LazyStore,
    pending: Mutex<Option<ClassificationResult>>,
}

impl ResultService {
    /// Creates the service over an open store.
    #[must_use]
    pub fn new(helper: ImageClassifierHelper, store: Arc<dyn ResultStore>) -> Self {
        Self::with_lazy_store(helper, LazyStore::ready(store))
    }

    pub(crate) fn with_lazy_store(helper: ImageClassifierHelper, store: LazyStore) -> Self {
        Self {
            helper,
            store,
            pending: Mutex::new(None),
        }
    }

    /// Classifies an image reference.
    ///
    /// The top category becomes the pending record; a run where nothing
    /// passes the threshold clears it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageDecode`] or [`Error::ModelUnavailable`] from the
    /// pipeline; the pending record is left untouched.
    pub async fn classify(
        &self,
        reference: impl Into<String>,
        crop: Option<CropRect>,
    ) -> Result<ClassificationOutcome> {
        let reference = reference.into();
        let helper = self.helper.clone();
        let outcome = run_blocking("classify", move || {
            helper.classify_with_crop(&reference, crop)
        })
        .await?;

        *acquire_lock(&self.pending) = outcome.to_record(current_timestamp_millis());
        Ok(outcome)
    }

    /// The record that [`Self::save`] would store.
    #[must_use]
    pub fn pending(&self) -> Option<ClassificationResult> {
        acquire_lock(&self.pending).clone()
    }

    /// Stores the pending record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if nothing is pending, or a storage
    /// error. The record stays pending if the write fails.
    pub async fn save(&self) -> Result<ResultId> {
        let record = self
            .pending()
            .ok_or_else(|| Error::InvalidInput("no classification result to save".to_string()))?;

        let store = self.store.clone();
        let ids = run_blocking("save_result", move || store.get()?.insert(&[record])).await?;
        let id = ids.into_iter().next().ok_or_else(|| Error::OperationFailed {
            operation: "save_result".to_string(),
            cause: "store returned no id".to_string(),
        })?;

        acquire_lock(&self.pending).take();
        tracing::info!(id = %id, "Classification result saved");
        Ok(id)
    }

    /// Deletes a stored record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the record was never stored, or a
    /// storage error.
    pub async fn delete(&self, record: &ClassificationResult) -> Result<bool> {
        let id = record
            .id
            .ok_or_else(|| Error::InvalidInput("record has not been saved".to_string()))?;
        let store = self.store.clone();
        run_blocking("delete_result", move || store.get()?.delete(id)).await
    }
}
