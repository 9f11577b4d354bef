//! Content store connection pool.
//!
//! Mirrors the shape of a typical pool module: one constructor that returns
//! a cloneable pool handle, used from every stage that touches Postgres.

use etl_common::{Error, Result};
use sqlx::postgres::{PgPoolOptions, PgSslMode};
use sqlx::PgPool;

/// Parameters needed to reach the content store. Held separately from
/// `PgPool` so callers can log `host`/`port`/`db` without reaching into
/// connection internals.
#[derive(Debug, Clone)]
pub struct PgConnectParams {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl PgConnectParams {
    fn connect_options(&self) -> sqlx::postgres::PgConnectOptions {
        sqlx::postgres::PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
            .ssl_mode(PgSslMode::Prefer)
    }
}

/// Default pool size; the content store is read-only and each pipeline
/// keeps its own pool, so this does not need to be large.
const MAX_CONNECTIONS: u32 = 5;

/// Build a connection pool against the content store. The pool is lazy:
/// this does not itself perform a round-trip, so a misconfigured host only
/// surfaces as a connection error on first query.
pub async fn init_pool(params: &PgConnectParams) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(params.connect_options())
        .await
        .map_err(|e| Error::connection(format!("failed to create content store pool: {e}")))
}
