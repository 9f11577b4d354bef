//! Pipeline Driver: runs one or more pipelines under a periodic tick,
//! respecting a shutdown signal between ticks but never mid-batch.
//!
//! Modelled on the file watcher's `tokio::select!` event loop: the sleep
//! between ticks races a cancellation signal instead of a channel receive.

use std::sync::Arc;
use std::time::Duration;

use etl_common::Result;
use tokio_util::sync::CancellationToken;

use crate::pipeline::Pipeline;

pub struct PipelineDriver {
    pipelines: Vec<Arc<dyn Pipeline>>,
    sync_delay: Duration,
    cancellation: CancellationToken,
}

impl PipelineDriver {
    pub fn new(
        pipelines: Vec<Arc<dyn Pipeline>>,
        sync_delay: Duration,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            pipelines,
            sync_delay,
            cancellation,
        }
    }

    /// Run every configured pipeline concurrently, each on its own tick
    /// loop, until the cancellation token fires or a pipeline hits a
    /// process-fatal error (§7). A tick in flight always finishes (and
    /// persists its cursor) before the driver exits. On a process-fatal
    /// error the shared cancellation token is tripped so every sibling
    /// pipeline also stops, and the first such error is returned to the
    /// caller so the process can exit non-zero.
    pub async fn run(self) -> Result<()> {
        let mut handles = Vec::with_capacity(self.pipelines.len());

        for pipeline in self.pipelines {
            let sync_delay = self.sync_delay;
            let cancellation = self.cancellation.clone();
            handles.push(tokio::spawn(async move {
                run_one(pipeline, sync_delay, cancellation).await
            }));
        }

        let mut first_fatal = None;
        for handle in handles {
            if let Ok(Err(e)) = handle.await {
                if first_fatal.is_none() {
                    first_fatal = Some(e);
                }
            }
        }

        match first_fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

async fn run_one(
    pipeline: Arc<dyn Pipeline>,
    sync_delay: Duration,
    cancellation: CancellationToken,
) -> Result<()> {
    loop {
        match pipeline.tick().await {
            Ok(()) => {}
            Err(e) if e.is_process_fatal() => {
                tracing::error!(pipeline = pipeline.name(), error = %e, "process-fatal error, stopping all pipelines");
                cancellation.cancel();
                return Err(e);
            }
            Err(e) => {
                tracing::error!(pipeline = pipeline.name(), error = %e, "tick failed, will retry next interval");
            }
        }

        tokio::select! {
            _ = cancellation.cancelled() => {
                tracing::info!(pipeline = pipeline.name(), "shutdown signal received, stopping driver");
                return Ok(());
            }
            _ = tokio::time::sleep(sync_delay) => {}
        }
    }
}
