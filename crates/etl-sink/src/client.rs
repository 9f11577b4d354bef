//! Sink Writer: index bootstrap and chunked bulk upsert against the search
//! engine, built the way a bounded `reqwest::Client` with a small
//! `url(path)` helper is built elsewhere in this codebase for other HTTP
//! dependencies — minus an API key, since the search engine has none.

use std::time::Duration;

use etl_common::{BackoffConfig, Error, Result};
use etl_transform::HasDocumentId;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of documents per `_bulk` request.
pub const DEFAULT_BULK_CHUNK_SIZE: usize = 500;

pub struct SinkWriter {
    client: Client,
    base_url: String,
    chunk_size: usize,
    backoff: BackoffConfig,
}

impl SinkWriter {
    pub fn new(host: &str, port: u16) -> Self {
        let client = Client::builder()
            .timeout(CONNECTION_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("failed to build HTTP client with timeout: {e}");
                Client::new()
            });

        Self {
            client,
            base_url: format!("http://{host}:{port}"),
            chunk_size: DEFAULT_BULK_CHUNK_SIZE,
            backoff: BackoffConfig::default(),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create `index` with `schema` if it does not already exist. A
    /// pre-existing index is a benign outcome, not an error.
    pub async fn ensure_index(&self, index: &str, schema: &Value) -> Result<()> {
        let exists = self.index_exists(index).await?;
        if exists {
            tracing::debug!(index, "index already exists");
            return Ok(());
        }

        let path = format!("/{index}");
        etl_common::with_backoff(self.backoff, || {
            let path = path.clone();
            async move {
                let response = self
                    .client
                    .put(self.url(&path))
                    .json(schema)
                    .send()
                    .await
                    .map_err(reqwest_err)?;
                let status = response.status();
                check_status(status, response.text().await.unwrap_or_default())
            }
        })
        .await
    }

    /// Inspects status inside the retry loop, the same way
    /// `TmdbProvider::get` inspects status before deciding whether to loop
    /// again: a 5xx here must be retried, not just a connection failure.
    async fn index_exists(&self, index: &str) -> Result<bool> {
        let path = format!("/{index}");
        etl_common::with_backoff(self.backoff, || {
            let path = path.clone();
            async move {
                let response = self
                    .client
                    .head(self.url(&path))
                    .send()
                    .await
                    .map_err(reqwest_err)?;

                match response.status() {
                    StatusCode::OK => Ok(true),
                    StatusCode::NOT_FOUND => Ok(false),
                    status if status.is_server_error() => Err(Error::SearchTransient {
                        status: status.as_u16(),
                        body: response.text().await.unwrap_or_default(),
                    }),
                    status => Err(Error::SearchRejected {
                        status: status.as_u16(),
                        body: response.text().await.unwrap_or_default(),
                    }),
                }
            }
        })
        .await
    }

    /// Bulk-upsert `docs` into `index`, framed as newline-delimited
    /// `{index meta}\n{source}` pairs and chunked so no request exceeds
    /// the configured chunk size. Each chunk is posted and retried
    /// independently.
    pub async fn bulk_upsert<T>(&self, index: &str, docs: &[T]) -> Result<()>
    where
        T: Serialize + HasDocumentId,
    {
        if docs.is_empty() {
            tracing::debug!(index, "bulk_upsert called with no documents, skipping");
            return Ok(());
        }

        for chunk in docs.chunks(self.chunk_size) {
            let body = encode_bulk_body(index, chunk)?;

            etl_common::with_backoff(self.backoff, || {
                let body = body.clone();
                async move {
                    let response = self
                        .client
                        .post(self.url("/_bulk"))
                        .header("Content-Type", "application/x-ndjson")
                        .body(body)
                        .send()
                        .await
                        .map_err(reqwest_err)?;
                    let status = response.status();
                    check_status(status, response.text().await.unwrap_or_default())
                }
            })
            .await?;
        }

        Ok(())
    }
}

/// Classify a response status: success passes through, 5xx is transient
/// (retried by the enclosing `with_backoff` loop), anything else is a
/// fatal rejection. Must be called from *inside* the retry closure — a
/// 503 inspected after `with_backoff` has already returned is too late to
/// retry.
fn check_status(status: StatusCode, body: String) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    if status.is_server_error() {
        return Err(Error::SearchTransient {
            status: status.as_u16(),
            body,
        });
    }
    Err(Error::SearchRejected {
        status: status.as_u16(),
        body,
    })
}

fn reqwest_err(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::timeout(e.to_string())
    } else if e.is_connect() {
        Error::connection(e.to_string())
    } else {
        Error::connection(e.to_string())
    }
}

/// Frame a chunk of documents as newline-delimited `{action}\n{source}`
/// pairs, `_id` taken from [`HasDocumentId::document_id`]. The body always
/// ends with a trailing newline.
fn encode_bulk_body<T>(index: &str, chunk: &[T]) -> Result<String>
where
    T: Serialize + HasDocumentId,
{
    let mut body = String::new();
    for doc in chunk {
        let action = serde_json::json!({
            "index": { "_index": index, "_id": doc.document_id() }
        });
        body.push_str(&serde_json::to_string(&action).map_err(|e| Error::internal(e.to_string()))?);
        body.push('\n');
        body.push_str(&serde_json::to_string(doc).map_err(|e| Error::internal(e.to_string()))?);
        body.push('\n');
    }
    Ok(body)
}
