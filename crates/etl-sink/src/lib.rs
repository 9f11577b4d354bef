//! Sink Writer and Loader: the search-engine-facing half of the pipeline.

pub mod client;
pub mod loader;
pub mod schema;

pub use client::{SinkWriter, DEFAULT_BULK_CHUNK_SIZE};
pub use loader::Loader;
