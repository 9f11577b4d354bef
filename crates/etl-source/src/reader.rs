//! Source Reader internals: error classification and the shared
//! "empty ID set short-circuits" rule used by the Enricher and Merger.

use etl_common::Error;

/// Classify a `sqlx::Error`: connection/pool/timeout problems are
/// transient and retried with backoff; everything else (syntax errors,
/// unknown columns, constraint violations) is fatal for the process.
pub fn map_sqlx_err(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            Error::connection(err.to_string())
        }
        sqlx::Error::Database(db_err) => Error::sql(db_err.to_string()),
        _ => Error::sql(err.to_string()),
    }
}

/// Format a comma-separated list of `$n` placeholders for a dynamic
/// `IN (...)` clause, starting at `$start`. Callers must check
/// `!ids.is_empty()` first: an empty IN-list is never sent.
pub fn in_list_placeholders(count: usize, start: usize) -> String {
    (0..count)
        .map(|i| format!("${}", start + i))
        .collect::<Vec<_>>()
        .join(", ")
}
