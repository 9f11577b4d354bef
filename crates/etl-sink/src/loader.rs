//! Loader: hand transformed documents to the Sink Writer. One loader call
//! is one bulk operation, internally chunked by the writer.

use std::sync::Arc;

use etl_common::Result;
use etl_transform::HasDocumentId;
use serde::Serialize;

use crate::client::SinkWriter;

pub struct Loader {
    sink: Arc<SinkWriter>,
    index: &'static str,
}

impl Loader {
    pub fn new(sink: Arc<SinkWriter>, index: &'static str) -> Self {
        Self { sink, index }
    }

    pub async fn load<T>(&self, docs: &[T]) -> Result<()>
    where
        T: Serialize + HasDocumentId,
    {
        tracing::info!(index = self.index, count = docs.len(), "loading documents");
        self.sink.bulk_upsert(self.index, docs).await
    }
}
