//! Pipeline Driver integration tests: shutdown only takes effect between
//! ticks, and a failing tick doesn't stop the loop.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use etl_common::{Error, Result};
use etl_pipeline::{Pipeline, PipelineDriver};
use tokio_util::sync::CancellationToken;

struct CountingPipeline {
    ticks: Arc<AtomicUsize>,
    cancel_after: usize,
    cancellation: CancellationToken,
    tick_duration: Duration,
}

#[async_trait]
impl Pipeline for CountingPipeline {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn tick(&self) -> Result<()> {
        tokio::time::sleep(self.tick_duration).await;
        let count = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
        if count >= self.cancel_after {
            // Request shutdown from inside the tick, exercising the
            // "finishes the in-flight tick, then stops" contract: the
            // driver must not tear down this tick itself.
            self.cancellation.cancel();
        }
        Ok(())
    }
}

#[tokio::test]
async fn shutdown_requested_mid_tick_still_lets_that_tick_finish() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let cancellation = CancellationToken::new();

    let pipeline = Arc::new(CountingPipeline {
        ticks: ticks.clone(),
        cancel_after: 1,
        cancellation: cancellation.clone(),
        tick_duration: Duration::from_millis(20),
    });

    let driver = PipelineDriver::new(
        vec![pipeline as Arc<dyn Pipeline>],
        Duration::from_secs(3600),
        cancellation,
    );

    tokio::time::timeout(Duration::from_secs(2), driver.run())
        .await
        .expect("driver should stop promptly once its one tick cancels itself")
        .expect("a clean shutdown is not an error");

    assert_eq!(ticks.load(Ordering::SeqCst), 1);
}

struct FailingThenRecoveringPipeline {
    attempts: Arc<AtomicUsize>,
    succeeds_on_attempt: usize,
    cancellation: CancellationToken,
}

#[async_trait]
impl Pipeline for FailingThenRecoveringPipeline {
    fn name(&self) -> &'static str {
        "failing-then-recovering"
    }

    async fn tick(&self) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt < self.succeeds_on_attempt {
            return Err(Error::internal("simulated tick failure"));
        }
        self.cancellation.cancel();
        Ok(())
    }
}

#[tokio::test]
async fn a_failing_tick_does_not_stop_the_loop() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let cancellation = CancellationToken::new();

    let pipeline = Arc::new(FailingThenRecoveringPipeline {
        attempts: attempts.clone(),
        succeeds_on_attempt: 3,
        cancellation: cancellation.clone(),
    });

    let driver = PipelineDriver::new(
        vec![pipeline as Arc<dyn Pipeline>],
        Duration::from_millis(1),
        cancellation,
    );

    tokio::time::timeout(Duration::from_secs(2), driver.run())
        .await
        .expect("driver should keep retrying past failed ticks until it succeeds")
        .expect("a recoverable tick failure must not surface as a driver error");

    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

struct AlwaysFatalPipeline {
    attempts: Arc<AtomicUsize>,
}

#[async_trait]
impl Pipeline for AlwaysFatalPipeline {
    fn name(&self) -> &'static str {
        "always-fatal"
    }

    async fn tick(&self) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::sql("column \"foo\" does not exist"))
    }
}

struct NeverTicksPipeline {
    cancellation: CancellationToken,
}

#[async_trait]
impl Pipeline for NeverTicksPipeline {
    fn name(&self) -> &'static str {
        "never-ticks"
    }

    async fn tick(&self) -> Result<()> {
        // Only returns once the sibling pipeline's fatal error cancels
        // the shared token; stands in for a long-running pipeline that
        // must be torn down rather than left running.
        self.cancellation.cancelled().await;
        Ok(())
    }
}

#[tokio::test]
async fn a_process_fatal_tick_error_stops_the_whole_driver_and_is_returned() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let cancellation = CancellationToken::new();

    let fatal = Arc::new(AlwaysFatalPipeline {
        attempts: attempts.clone(),
    });
    let sibling = Arc::new(NeverTicksPipeline {
        cancellation: cancellation.clone(),
    });

    let driver = PipelineDriver::new(
        vec![fatal as Arc<dyn Pipeline>, sibling as Arc<dyn Pipeline>],
        Duration::from_secs(3600),
        cancellation,
    );

    let result = tokio::time::timeout(Duration::from_secs(2), driver.run())
        .await
        .expect("a process-fatal error must stop the driver promptly, not hang until shutdown");

    assert!(matches!(result, Err(Error::Sql(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
