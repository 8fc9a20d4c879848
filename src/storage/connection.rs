//! Connection handling for the `SQLite` store.

use crate::Result;
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

/// Acquires a mutex, recovering the inner value if it was poisoned.
///
/// A panic inside one store operation must not make the history unusable for
/// the rest of the process.
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("SQLite mutex was poisoned, recovering");
            metrics::counter!("sqlite_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Applies the connection pragmas.
///
/// - `journal_mode = WAL`
/// - `synchronous = NORMAL`
/// - `busy_timeout = 5000`
///
/// Pragma failures are ignored: an in-memory database reports `memory` for
/// the journal mode, which is fine.
///
/// # Errors
///
/// Currently infallible; the signature leaves room for pragmas that must
/// succeed.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    let _ = conn.pragma_update(None, "busy_timeout", "5000");
    Ok(())
}

/// Records a store operation.
///
/// Emits `result_store_ops` (counter) and `result_store_duration_ms`
/// (histogram), both labelled by operation and status.
pub fn record_operation_metrics(operation: &'static str, start: Instant, status: &'static str) {
    metrics::counter!(
        "result_store_ops",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "result_store_duration_ms",
        "operation" => operation,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_acquire_lock_success() {
        let mutex = Mutex::new(42);
        assert_eq!(*acquire_lock(&mutex), 42);
    }

    #[test]
    fn test_acquire_lock_recovers_from_poison() {
        let mutex = Arc::new(Mutex::new(1));
        let poisoner = Arc::clone(&mutex);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the mutex");
        })
        .join();

        assert!(mutex.is_poisoned());
        let mut guard = acquire_lock(&mutex);
        *guard += 1;
        assert_eq!(*guard, 2);
    }

    #[test]
    fn test_configure_connection_sets_busy_timeout() {
        let conn = Connection::open_in_memory().unwrap();
        configure_connection(&conn).unwrap();
        let timeout: i64 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, 5000);
    }

    #[test]
    fn test_record_operation_metrics_without_recorder() {
        // No recorder is installed; recording must still be a no-op.
        record_operation_metrics("list_all", Instant::now(), "success");
        record_operation_metrics("insert", Instant::now(), "error");
    }
}
