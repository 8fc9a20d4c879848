//! `SQLite` implementation of the result store.

use super::ResultStore;
use super::connection::{acquire_lock, configure_connection, record_operation_metrics};
use crate::models::{ClassificationResult, ResultId, validate_score};
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

/// Schema version stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i32 = 1;

/// File name of the history database inside the data directory.
pub const DATABASE_FILE: &str = "db_asclepius.sqlite";

const SELECT_COLUMNS: &str = "SELECT id, timestamp, image_uri, label, score FROM classificationresult";

/// SQLite-backed classification history.
pub struct SqliteResultStore {
    /// Database connection (mutex for interior mutability).
    conn: Mutex<Connection>,
    /// Database file, `None` for in-memory stores.
    path: Option<PathBuf>,
}

impl SqliteResultStore {
    /// Opens (or creates) the store at `path`.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the directory or database cannot
    /// be created, or if the file holds an unsupported schema version.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_data_dir".to_string(),
                cause: format!("{}: {e}", parent.display()),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| Error::OperationFailed {
            operation: "open_result_database".to_string(),
            cause: e.to_string(),
        })?;
        configure_connection(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        };
        store.initialize_schema()?;
        tracing::debug!(path = %path.display(), "Opened result store");
        Ok(store)
    }

    /// Creates an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::OperationFailed {
            operation: "open_result_database_memory".to_string(),
            cause: e.to_string(),
        })?;

        let store = Self {
            conn: Mutex::new(conn),
            path: None,
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// The database file, if the store is on disk.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);

        let version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .map_err(|e| Error::OperationFailed {
                operation: "read_schema_version".to_string(),
                cause: e.to_string(),
            })?;

        if version > SCHEMA_VERSION {
            return Err(Error::OperationFailed {
                operation: "initialize_schema".to_string(),
                cause: format!(
                    "database schema version {version} is newer than supported version {SCHEMA_VERSION}"
                ),
            });
        }

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS classificationresult (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp INTEGER NOT NULL,
                image_uri TEXT NOT NULL,
                label TEXT NOT NULL,
                score REAL NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_classificationresult_timestamp
                ON classificationresult(timestamp);

            PRAGMA user_version = 1;
            ",
        )
        .map_err(|e| Error::OperationFailed {
            operation: "initialize_schema".to_string(),
            cause: e.to_string(),
        })
    }

    fn list_inner(&self) -> Result<Vec<ClassificationResult>> {
        let conn = acquire_lock(&self.conn);
        let mut stmt = conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY timestamp DESC, id DESC"))
            .map_err(|e| op_failed("list_all", &e))?;

        let rows = stmt
            .query_map([], row_to_result)
            .map_err(|e| op_failed("list_all", &e))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| op_failed("list_all", &e))
    }

    fn get_inner(&self, id: ResultId) -> Result<Option<ClassificationResult>> {
        let conn = acquire_lock(&self.conn);
        conn.query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id.as_i64()],
            row_to_result,
        )
        .optional()
        .map_err(|e| op_failed("get", &e))
    }

    fn insert_inner(&self, records: &[ClassificationResult]) -> Result<Vec<ResultId>> {
        for record in records {
            validate_score(record.score)?;
        }

        let mut conn = acquire_lock(&self.conn);
        let tx = conn.transaction().map_err(|e| op_failed("insert", &e))?;

        let mut ids = Vec::with_capacity(records.len());
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO classificationresult
                        (id, timestamp, image_uri, label, score)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|e| op_failed("insert", &e))?;

            for record in records {
                stmt.execute(params![
                    record.id.map(ResultId::as_i64),
                    record.timestamp,
                    record.image_uri,
                    record.label,
                    f64::from(record.score),
                ])
                .map_err(|e| op_failed("insert", &e))?;

                let id = record
                    .id
                    .unwrap_or_else(|| ResultId::new(tx.last_insert_rowid()));
                ids.push(id);
            }
        }

        tx.commit().map_err(|e| op_failed("insert", &e))?;
        Ok(ids)
    }

    fn delete_inner(&self, id: ResultId) -> Result<bool> {
        let conn = acquire_lock(&self.conn);
        let removed = conn
            .execute(
                "DELETE FROM classificationresult WHERE id = ?1",
                params![id.as_i64()],
            )
            .map_err(|e| op_failed("delete", &e))?;
        Ok(removed > 0)
    }
}

impl ResultStore for SqliteResultStore {
    fn list_all(&self) -> Result<Vec<ClassificationResult>> {
        instrumented("list_all", || self.list_inner())
    }

    fn get(&self, id: ResultId) -> Result<Option<ClassificationResult>> {
        instrumented("get", || self.get_inner(id))
    }

    fn insert(&self, records: &[ClassificationResult]) -> Result<Vec<ResultId>> {
        instrumented("insert", || self.insert_inner(records))
    }

    fn delete(&self, id: ResultId) -> Result<bool> {
        instrumented("delete", || self.delete_inner(id))
    }

    fn schema_version(&self) -> Result<i32> {
        let conn = acquire_lock(&self.conn);
        conn.pragma_query_value(None, "user_version", |row| row.get(0))
            .map_err(|e| op_failed("schema_version", &e))
    }
}

fn instrumented<T>(operation: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let start = Instant::now();
    let result = f();
    let status = if result.is_ok() { "success" } else { "error" };
    record_operation_metrics(operation, start, status);
    if let Err(e) = &result {
        tracing::error!(operation, error = %e, "Result store operation failed");
    }
    result
}

fn op_failed(operation: &str, e: &rusqlite::Error) -> Error {
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: e.to_string(),
    }
}

// A REAL column holds the f64 widening of the stored f32, so narrowing back is exact.
#[allow(clippy::cast_possible_truncation)]
fn row_to_result(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClassificationResult> {
    Ok(ClassificationResult {
        id: Some(ResultId::new(row.get(0)?)),
        timestamp: row.get(1)?,
        image_uri: row.get(2)?,
        label: row.get(3)?,
        score: row.get::<_, f64>(4)? as f32,
    })
}
