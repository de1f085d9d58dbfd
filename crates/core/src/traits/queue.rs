use async_trait::async_trait;

use crate::error::Result;
use crate::types::ExecutionJob;

/// Work-queue seam between the submitting side and the worker pool.
///
/// Delivery is at-least-once with no ordering guarantee across distinct
/// submissions; consumers must tolerate duplicates.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Push a job onto the queue.
    async fn enqueue(&self, job: ExecutionJob) -> Result<()>;

    /// Pop the next job, waiting briefly; `None` when the queue stayed
    /// empty for the poll interval, so callers can re-check shutdown.
    async fn dequeue(&self) -> Result<Option<ExecutionJob>>;
}
