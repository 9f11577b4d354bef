//! Postgres connection pool and the SQL-bound half of the pipeline:
//! Producer, Enricher, and Merger.

pub mod enricher;
pub mod merger;
pub mod pool;
pub mod producer;
pub mod reader;

pub use enricher::{Enricher, JoinTable};
pub use merger::Merger;
pub use pool::{init_pool, PgConnectParams};
pub use producer::Producer;
