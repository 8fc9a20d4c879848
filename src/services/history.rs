//! Classification history.

use super::run_blocking;
use crate::models::{ClassificationResult, ResultId};
use crate::storage::ResultStore;
use crate::{Error, Result};
use std::sync::Arc;
use tokio::sync::watch;

/// Observable view of the saved classification results.
///
/// The holder starts empty; [`Self::refresh`] loads it and every mutation
/// reloads it afterwards.
pub struct HistoryService {
    store: Arc<dyn ResultStore>,
    results: watch::Sender<Vec<ClassificationResult>>,
}

impl HistoryService {
    /// Creates a history service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ResultStore>) -> Self {
        let (results, _) = watch::channel(Vec::new());
        Self { store, results }
    }

    /// Subscribes to the result list, newest first.
    #[must_use]
    pub fn results(&self) -> watch::Receiver<Vec<ClassificationResult>> {
        self.results.subscribe()
    }

    /// Reloads the result list from the store and publishes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read; the holder keeps its
    /// previous value.
    pub async fn refresh(&self) -> Result<Vec<ClassificationResult>> {
        let store = Arc::clone(&self.store);
        let results = run_blocking("history_refresh", move || store.list_all()).await?;
        tracing::debug!(count = results.len(), "History refreshed");
        self.results.send_replace(results.clone());
        Ok(results)
    }

    /// Fetches one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn get(&self, id: ResultId) -> Result<Option<ClassificationResult>> {
        let store = Arc::clone(&self.store);
        run_blocking("history_get", move || store.get(id)).await
    }

    /// Saves a record and refreshes the list.
    ///
    /// A failed refresh is logged; the record is stored and its id returned
    /// regardless.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is invalid or the store cannot be
    /// written.
    pub async fn insert(&self, record: ClassificationResult) -> Result<ResultId> {
        let store = Arc::clone(&self.store);
        let ids = run_blocking("history_insert", move || store.insert(&[record])).await?;
        let id = ids.into_iter().next().ok_or_else(|| Error::OperationFailed {
            operation: "history_insert".to_string(),
            cause: "store returned no id".to_string(),
        })?;
        self.refresh_after("insert").await;
        Ok(id)
    }

    /// Deletes a record and refreshes the list.
    ///
    /// Returns `true` if the record existed. A failed refresh is logged and
    /// does not change the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub async fn delete(&self, id: ResultId) -> Result<bool> {
        let store = Arc::clone(&self.store);
        let removed = run_blocking("history_delete", move || store.delete(id)).await?;
        self.refresh_after("delete").await;
        Ok(removed)
    }

    async fn refresh_after(&self, mutation: &'static str) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(mutation, error = %e, "History refresh failed after write");
        }
    }
}
