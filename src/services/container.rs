//! Service wiring.

use super::{HistoryService, NewsFeed, ResultService};
use crate::classifier::{ImageClassifierHelper, OnnxClassifier};
use crate::config::AsclepiusConfig;
use crate::storage::{ResultStore, SqliteResultStore};
use crate::{Error, Result};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// A result store that is opened on first use.
///
/// Clones share the same cell, so the database is opened at most once.
#[derive(Clone)]
pub(crate) struct LazyStore {
    path: Option<PathBuf>,
    cell: Arc<OnceLock<Arc<dyn ResultStore>>>,
}

impl LazyStore {
    /// A store at `path`, opened when first requested.
    pub(crate) fn at(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            cell: Arc::new(OnceLock::new()),
        }
    }

    /// An already open store.
    pub(crate) fn ready(store: Arc<dyn ResultStore>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(store);
        Self {
            path: None,
            cell: Arc::new(cell),
        }
    }

    /// Returns the store, opening it if needed.
    ///
    /// Opening blocks; call this off the async runtime.
    pub(crate) fn get(&self) -> Result<Arc<dyn ResultStore>> {
        if let Some(store) = self.cell.get() {
            return Ok(Arc::clone(store));
        }
        let path = self.path.as_ref().ok_or_else(|| Error::OperationFailed {
            operation: "open_result_store".to_string(),
            cause: "no database path configured".to_string(),
        })?;
        tracing::debug!(path = %path.display(), "Opening result store");
        let opened: Arc<dyn ResultStore> = Arc::new(SqliteResultStore::open(path)?);
        Ok(Arc::clone(self.cell.get_or_init(|| opened)))
    }
}

/// Builds services from one configuration.
///
/// The result store is opened on first use and shared by every service the
/// container hands out.
pub struct ServiceContainer {
    config: AsclepiusConfig,
    store: LazyStore,
}

impl ServiceContainer {
    /// Creates a container; nothing is opened yet.
    #[must_use]
    pub fn from_config(config: AsclepiusConfig) -> Self {
        let store = LazyStore::at(config.database_path());
        Self { config, store }
    }

    /// Creates a container over an already open store.
    #[must_use]
    pub fn with_store(config: AsclepiusConfig, store: Arc<dyn ResultStore>) -> Self {
        Self {
            config,
            store: LazyStore::ready(store),
        }
    }

    /// The configuration the services are built from.
    #[must_use]
    pub const fn config(&self) -> &AsclepiusConfig {
        &self.config
    }

    /// Returns the shared result store, opening it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn store(&self) -> Result<Arc<dyn ResultStore>> {
        self.store.get()
    }

    /// History service over the shared store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn history(&self) -> Result<HistoryService> {
        Ok(HistoryService::new(self.store()?))
    }

    /// News feed over the configured news API.
    #[must_use]
    pub fn news_feed(&self) -> NewsFeed {
        NewsFeed::new(Arc::new(self.config.news.repository()))
    }

    /// Classification service using the configured ONNX model.
    ///
    /// Neither the model nor the database is opened here: the model loads on
    /// the first classification and the database on the first save.
    #[must_use]
    pub fn result_service(&self) -> ResultService {
        let options = self.config.classifier_options();
        let helper = ImageClassifierHelper::new(OnnxClassifier::new(&options), options);
        ResultService::with_lazy_store(helper, self.store.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassificationResult;

    #[test]
    fn test_store_opened_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = AsclepiusConfig::default().with_data_dir(dir.path());
        let container = ServiceContainer::from_config(config);

        let first = container.store().unwrap();
        let second = container.store().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(dir.path().join("db_asclepius.sqlite").exists());
    }

    #[test]
    fn test_result_service_does_not_open_store() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let container =
            ServiceContainer::from_config(AsclepiusConfig::default().with_data_dir(&data_dir));

        let _service = container.result_service();
        assert!(!data_dir.exists());

        container.store().unwrap();
        assert!(data_dir.join("db_asclepius.sqlite").exists());
    }

    #[tokio::test]
    async fn test_services_share_store() {
        let store: Arc<dyn ResultStore> = Arc::new(SqliteResultStore::in_memory().unwrap());
        let container = ServiceContainer::with_store(AsclepiusConfig::default(), store);

        let history = container.history().unwrap();
        let record = ClassificationResult::new(5, "a.jpg", "Cancer", 0.9).unwrap();
        history.insert(record).await.unwrap();

        let again = container.history().unwrap();
        assert_eq!(again.refresh().await.unwrap().len(), 1);
    }
}
