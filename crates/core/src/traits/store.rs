//! Persistence seams of the grading core.
//!
//! The engine consumes and produces records through these narrow
//! contracts; the relational store behind them is an external
//! collaborator. Atomicity of counters and upserts is delegated to the
//! implementation (conditional update / unique-key upsert).

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    Challenge, GradedResult, ProgressRecord, Submission, SubmissionStatus, TestCase, XpGrant,
};

/// Persistence for submission records.
///
/// Status and score writes are last-write-wins so that redelivered jobs
/// converge on the same terminal record.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Persist a fresh submission (done by the external enqueuer).
    async fn insert(&self, submission: Submission) -> Result<()>;

    /// Load a submission by ID.
    async fn get(&self, id: &str) -> Result<Option<Submission>>;

    /// Overwrite the lifecycle status.
    async fn set_status(&self, id: &str, status: SubmissionStatus) -> Result<()>;

    /// Write a terminal grading result.
    async fn record_result(&self, id: &str, result: GradedResult) -> Result<()>;

    /// Mark the submission `ERROR` with a diagnostic message.
    async fn record_failure(&self, id: &str, message: &str) -> Result<()>;
}

/// Read-only access to challenge data owned by content management.
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Grading parameters for a challenge.
    async fn challenge(&self, id: &str) -> Result<Option<Challenge>>;

    /// Test cases ordered by ascending weight (stable tie-break).
    async fn test_cases(&self, id: &str) -> Result<Vec<TestCase>>;
}

/// Per-user, per-challenge progress records.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Look up the progress record for a `(user, challenge)` pair.
    async fn find(&self, user_id: &str, challenge_id: &str) -> Result<Option<ProgressRecord>>;

    /// Fold one graded attempt into the record: `completed` latches on a
    /// perfect score, `best_score` only ever grows, `attempts` bumps by
    /// one. Returns the updated record.
    async fn upsert_attempt(
        &self,
        user_id: &str,
        challenge_id: &str,
        score: u8,
    ) -> Result<ProgressRecord>;
}

/// Experience-point ledger.
#[async_trait]
pub trait XpLedger: Send + Sync {
    /// Record a grant and apply it to the user's cumulative total as one
    /// unit, so replays cannot split the pair.
    async fn grant(&self, grant: XpGrant) -> Result<()>;

    /// Cumulative XP for a user.
    async fn total_for(&self, user_id: &str) -> Result<u64>;

    /// All grants for a `(user, challenge)` pair.
    async fn grants_for(&self, user_id: &str, challenge_id: &str) -> Result<Vec<XpGrant>>;
}
