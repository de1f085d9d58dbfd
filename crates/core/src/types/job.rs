use serde::{Deserialize, Serialize};

/// Work item consumed from the execution queue.
///
/// This is the ingestion contract with the submitting side: the
/// submission record already exists as `PENDING` when the job arrives.
/// Delivery is at-least-once, so processing the same job twice must be
/// safe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionJob {
    pub submission_id: String,
    pub challenge_id: String,
    pub code: String,
    pub language: String,
    pub user_id: String,
}
