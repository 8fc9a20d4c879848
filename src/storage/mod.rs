//! Local record store for classification history.
//!
//! The store keeps every saved [`ClassificationResult`] in a single `SQLite`
//! table. Records are listed newest first, fetched by id, inserted (or
//! replaced when they already carry an id), and deleted one at a time.

// Connection guards are held for the whole statement.
#![allow(clippy::significant_drop_tightening)]

mod connection;
mod sqlite;

pub use connection::{acquire_lock, configure_connection, record_operation_metrics};
pub use sqlite::{DATABASE_FILE, SCHEMA_VERSION, SqliteResultStore};

use crate::Result;
use crate::models::{ClassificationResult, ResultId};

/// Trait for classification history backends.
///
/// Implementations must be thread-safe (`Send + Sync`); the services share a
/// single store behind an `Arc<dyn ResultStore>`.
pub trait ResultStore: Send + Sync {
    /// Lists every stored record, newest first.
    ///
    /// Records with the same timestamp are ordered by descending id.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    fn list_all(&self) -> Result<Vec<ClassificationResult>>;

    /// Fetches a record by id.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    fn get(&self, id: ResultId) -> Result<Option<ClassificationResult>>;

    /// Inserts records, replacing any existing row with the same id.
    ///
    /// Records without an id are assigned a fresh one. Returns the ids of the
    /// stored records in input order. All records are written in a single
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] if a score is outside `[0, 1]`,
    /// or an error if storage cannot be accessed.
    fn insert(&self, records: &[ClassificationResult]) -> Result<Vec<ResultId>>;

    /// Deletes a record.
    ///
    /// Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    fn delete(&self, id: ResultId) -> Result<bool>;

    /// Returns the schema version of the underlying store.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be accessed.
    fn schema_version(&self) -> Result<i32>;
}
