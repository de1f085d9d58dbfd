//! Worker pool.
//!
//! Concurrency across submissions comes purely from running several
//! independent workers; each blocks on one submission end to end.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use judge_core::WorkQueue;

use crate::processor::ExecutionProcessor;

/// Run `count` workers until the shutdown signal flips to `true`.
pub async fn run_worker_pool(
    count: usize,
    queue: Arc<dyn WorkQueue>,
    processor: Arc<ExecutionProcessor>,
    shutdown: watch::Receiver<bool>,
) {
    let mut handles = Vec::with_capacity(count);
    for id in 0..count {
        handles.push(tokio::spawn(worker_loop(
            id,
            queue.clone(),
            processor.clone(),
            shutdown.clone(),
        )));
    }

    for handle in handles {
        if let Err(err) = handle.await {
            tracing::error!(error = %err, "worker task panicked");
        }
    }
}

async fn worker_loop(
    id: usize,
    queue: Arc<dyn WorkQueue>,
    processor: Arc<ExecutionProcessor>,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::info!(worker = id, "worker started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            _ = shutdown.changed() => break,
            next = queue.dequeue() => match next {
                Ok(Some(job)) => {
                    if let Err(err) = processor.process(&job).await {
                        tracing::error!(
                            worker = id,
                            submission = %job.submission_id,
                            error = %err,
                            "submission processing failed"
                        );
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(worker = id, error = %err, "queue poll failed");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    tracing::info!(worker = id, "worker stopped");
}
