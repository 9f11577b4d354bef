//! Producer: detect changed rows in one source table and emit their
//! primary keys in batches, advancing the cursor only after each batch has
//! been accepted downstream.

use std::future::Future;

use etl_common::{BackoffConfig, Error, Result, Stream};
use etl_cursor::CursorStore;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::reader::map_sqlx_err;

pub struct Producer {
    pool: PgPool,
    table: &'static str,
    stream: Stream,
    batch_limit: i64,
    backoff: BackoffConfig,
}

impl Producer {
    pub fn new(pool: PgPool, table: &'static str, stream: Stream, batch_limit: i64) -> Self {
        Self {
            pool,
            table,
            stream,
            batch_limit,
            backoff: BackoffConfig::default(),
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Runs to completion: repeatedly fetch up to `batch_limit` rows with
    /// `modified >= cursor`, hand their ids to `on_batch`, then persist the
    /// new cursor. Terminates on an empty batch.
    pub async fn run<F, Fut>(
        &self,
        cursor_store: &dyn CursorStore,
        default_epoch: &str,
        mut on_batch: F,
    ) -> Result<()>
    where
        F: FnMut(Vec<Uuid>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut cursor = cursor_store
            .get(self.stream.key())
            .unwrap_or_else(|| default_epoch.to_string());

        // `modified` is selected and bound as text throughout: the cursor is
        // an opaque string handed back to the same predicate next call, not
        // a value this code parses or reformats. The cast to `timestamptz`
        // on the bound parameter lets Postgres compare it against the
        // column; the `::text` on the selected column is what keeps the
        // stored cursor byte-identical to what the database holds.
        let sql = format!(
            "SELECT id, modified::text AS modified FROM content.{table} \
             WHERE modified >= $1::timestamptz ORDER BY modified ASC LIMIT $2",
            table = self.table,
        );

        loop {
            let cursor_for_query = cursor.clone();
            let rows = etl_common::with_backoff(self.backoff, || {
                let sql = sql.as_str();
                let cursor_for_query = cursor_for_query.clone();
                let pool = self.pool.clone();
                let limit = self.batch_limit;
                async move {
                    sqlx::query(sql)
                        .bind(cursor_for_query)
                        .bind(limit)
                        .fetch_all(&pool)
                        .await
                        .map_err(map_sqlx_err)
                }
            })
            .await?;

            if rows.is_empty() {
                tracing::debug!(stream = %self.stream, "producer drained");
                return Ok(());
            }

            let mut ids = Vec::with_capacity(rows.len());
            let mut max_modified: Option<String> = None;
            for row in &rows {
                let id: Uuid = row
                    .try_get("id")
                    .map_err(|e| Error::malformed_row(e.to_string()))?;
                let modified: String = row
                    .try_get("modified")
                    .map_err(|e| Error::malformed_row(e.to_string()))?;
                ids.push(id);
                max_modified = Some(modified);
            }

            let batch_len = ids.len();
            on_batch(ids).await?;

            let new_cursor = max_modified.expect("non-empty batch always has a max modified");
            cursor_store.set(self.stream.key(), new_cursor.clone())?;
            tracing::info!(stream = %self.stream, batch_len, cursor = %new_cursor, "producer batch committed");
            cursor = new_cursor;
        }
    }
}
