//! In-memory store implementations using DashMap.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use judge_core::{
    traits::{ChallengeStore, ProgressStore, SubmissionStore, WorkQueue, XpLedger},
    Challenge, Error, ExecutionJob, GradedResult, ProgressRecord, Result, Submission,
    SubmissionStatus, TestCase, XpGrant,
};

// =============================================================================
// Submissions
// =============================================================================

/// In-memory submission store.
#[derive(Default)]
pub struct InMemorySubmissionStore {
    submissions: DashMap<String, Submission>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn insert(&self, submission: Submission) -> Result<()> {
        self.submissions.insert(submission.id.clone(), submission);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Submission>> {
        Ok(self.submissions.get(id).map(|s| s.clone()))
    }

    async fn set_status(&self, id: &str, status: SubmissionStatus) -> Result<()> {
        let mut entry = self
            .submissions
            .get_mut(id)
            .ok_or_else(|| Error::storage(format!("submission {} not found", id)))?;
        entry.status = status;
        Ok(())
    }

    async fn record_result(&self, id: &str, result: GradedResult) -> Result<()> {
        let mut entry = self
            .submissions
            .get_mut(id)
            .ok_or_else(|| Error::storage(format!("submission {} not found", id)))?;
        entry.status = result.status;
        entry.score = result.score;
        entry.execution_time_ms = result.execution_time_ms;
        entry.test_results = result.test_results;
        entry.error_message = result.error_message;
        Ok(())
    }

    async fn record_failure(&self, id: &str, message: &str) -> Result<()> {
        let mut entry = self
            .submissions
            .get_mut(id)
            .ok_or_else(|| Error::storage(format!("submission {} not found", id)))?;
        entry.status = SubmissionStatus::Error;
        entry.error_message = Some(message.to_string());
        Ok(())
    }
}

// =============================================================================
// Challenges
// =============================================================================

/// In-memory challenge catalog.
#[derive(Default)]
pub struct InMemoryChallengeStore {
    challenges: DashMap<String, Challenge>,
    cases: DashMap<String, Vec<TestCase>>,
}

impl InMemoryChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a challenge and its test cases.
    pub fn insert(&self, challenge: Challenge, cases: Vec<TestCase>) {
        self.cases.insert(challenge.id.clone(), cases);
        self.challenges.insert(challenge.id.clone(), challenge);
    }
}

#[async_trait]
impl ChallengeStore for InMemoryChallengeStore {
    async fn challenge(&self, id: &str) -> Result<Option<Challenge>> {
        Ok(self.challenges.get(id).map(|c| c.clone()))
    }

    async fn test_cases(&self, id: &str) -> Result<Vec<TestCase>> {
        let mut cases = self.cases.get(id).map(|c| c.clone()).unwrap_or_default();
        // Ascending weight, stable on ties.
        cases.sort_by(|a, b| {
            a.weight
                .partial_cmp(&b.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(cases)
    }
}

// =============================================================================
// Progress
// =============================================================================

/// In-memory progress records keyed by `(user, challenge)`.
#[derive(Default)]
pub struct InMemoryProgressStore {
    records: DashMap<(String, String), ProgressRecord>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn find(&self, user_id: &str, challenge_id: &str) -> Result<Option<ProgressRecord>> {
        Ok(self
            .records
            .get(&(user_id.to_string(), challenge_id.to_string()))
            .map(|r| r.clone()))
    }

    async fn upsert_attempt(
        &self,
        user_id: &str,
        challenge_id: &str,
        score: u8,
    ) -> Result<ProgressRecord> {
        let key = (user_id.to_string(), challenge_id.to_string());
        let mut entry = self.records.entry(key).or_insert_with(|| ProgressRecord {
            user_id: user_id.to_string(),
            challenge_id: challenge_id.to_string(),
            completed: false,
            best_score: 0,
            attempts: 0,
            last_attempt_at: Utc::now(),
        });

        let record = entry.value_mut();
        // `completed` latches so a later failed attempt cannot reopen the
        // XP grant window.
        record.completed = record.completed || score == 100;
        record.best_score = record.best_score.max(score);
        record.attempts += 1;
        record.last_attempt_at = Utc::now();

        Ok(record.clone())
    }
}

// =============================================================================
// XP Ledger
// =============================================================================

struct LedgerState {
    grants: Vec<XpGrant>,
    totals: HashMap<String, u64>,
}

/// In-memory XP ledger.
///
/// One lock covers the grant record and the cumulative total, so the
/// pair is applied together the way a transactional store would.
pub struct InMemoryXpLedger {
    state: std::sync::Mutex<LedgerState>,
}

impl InMemoryXpLedger {
    pub fn new() -> Self {
        Self {
            state: std::sync::Mutex::new(LedgerState {
                grants: Vec::new(),
                totals: HashMap::new(),
            }),
        }
    }
}

impl Default for InMemoryXpLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl XpLedger for InMemoryXpLedger {
    async fn grant(&self, grant: XpGrant) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        *state.totals.entry(grant.user_id.clone()).or_insert(0) += grant.amount;
        state.grants.push(grant);
        Ok(())
    }

    async fn total_for(&self, user_id: &str) -> Result<u64> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .totals
            .get(user_id)
            .copied()
            .unwrap_or(0))
    }

    async fn grants_for(&self, user_id: &str, challenge_id: &str) -> Result<Vec<XpGrant>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .grants
            .iter()
            .filter(|g| g.user_id == user_id && g.challenge_id == challenge_id)
            .cloned()
            .collect())
    }
}

// =============================================================================
// Work Queue
// =============================================================================

/// In-memory FIFO work queue for tests and single-node runs.
pub struct InMemoryWorkQueue {
    jobs: tokio::sync::Mutex<VecDeque<ExecutionJob>>,
    notify: tokio::sync::Notify,
}

impl InMemoryWorkQueue {
    pub fn new() -> Self {
        Self {
            jobs: tokio::sync::Mutex::new(VecDeque::new()),
            notify: tokio::sync::Notify::new(),
        }
    }
}

impl Default for InMemoryWorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkQueue for InMemoryWorkQueue {
    async fn enqueue(&self, job: ExecutionJob) -> Result<()> {
        self.jobs.lock().await.push_back(job);
        self.notify.notify_one();
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<ExecutionJob>> {
        if let Some(job) = self.jobs.lock().await.pop_front() {
            return Ok(Some(job));
        }

        // Brief wait; a missed notification is caught by the next poll.
        let _ = tokio::time::timeout(Duration::from_millis(250), self.notify.notified()).await;
        Ok(self.jobs.lock().await.pop_front())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_progress_upsert_laws() {
        let store = InMemoryProgressStore::new();

        let first = store.upsert_attempt("u1", "c1", 60).await.unwrap();
        assert_eq!(first.best_score, 60);
        assert_eq!(first.attempts, 1);
        assert!(!first.completed);

        // Lower score never degrades best_score.
        let second = store.upsert_attempt("u1", "c1", 40).await.unwrap();
        assert_eq!(second.best_score, 60);
        assert_eq!(second.attempts, 2);

        let third = store.upsert_attempt("u1", "c1", 100).await.unwrap();
        assert_eq!(third.best_score, 100);
        assert!(third.completed);

        // Completion latches across later failures.
        let fourth = store.upsert_attempt("u1", "c1", 20).await.unwrap();
        assert!(fourth.completed);
        assert_eq!(fourth.best_score, 100);
        assert_eq!(fourth.attempts, 4);
    }

    #[tokio::test]
    async fn test_xp_ledger_applies_grant_and_total_together() {
        let ledger = InMemoryXpLedger::new();
        ledger
            .grant(XpGrant {
                user_id: "u1".into(),
                challenge_id: "c1".into(),
                amount: 50,
                reason: "challenge_completed".into(),
                metadata: serde_json::json!({}),
            })
            .await
            .unwrap();

        assert_eq!(ledger.total_for("u1").await.unwrap(), 50);
        assert_eq!(ledger.grants_for("u1", "c1").await.unwrap().len(), 1);
        assert_eq!(ledger.total_for("u2").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_work_queue_is_fifo() {
        let queue = InMemoryWorkQueue::new();
        for id in ["s1", "s2", "s3"] {
            queue
                .enqueue(ExecutionJob {
                    submission_id: id.into(),
                    challenge_id: "c".into(),
                    code: String::new(),
                    language: "python".into(),
                    user_id: "u".into(),
                })
                .await
                .unwrap();
        }

        assert_eq!(queue.dequeue().await.unwrap().unwrap().submission_id, "s1");
        assert_eq!(queue.dequeue().await.unwrap().unwrap().submission_id, "s2");
        assert_eq!(queue.dequeue().await.unwrap().unwrap().submission_id, "s3");
        assert!(queue.dequeue().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_challenge_store_orders_cases_by_weight() {
        let store = InMemoryChallengeStore::new();
        store.insert(
            Challenge {
                id: "c1".into(),
                title: "Sum".into(),
                time_limit_ms: 3000,
                memory_limit_mb: 256,
                xp_reward: 50,
            },
            vec![
                TestCase::new("heavy", "").with_weight(5.0),
                TestCase::new("light", "").with_weight(1.0),
            ],
        );

        let cases = store.test_cases("c1").await.unwrap();
        assert_eq!(cases[0].input, "light");
        assert_eq!(cases[1].input, "heavy");
    }

    #[tokio::test]
    async fn test_submission_status_writes_are_idempotent() {
        let store = InMemorySubmissionStore::new();
        store
            .insert(Submission::pending("s1", "u1", "c1", "python"))
            .await
            .unwrap();

        store
            .set_status("s1", SubmissionStatus::Running)
            .await
            .unwrap();
        store
            .set_status("s1", SubmissionStatus::Running)
            .await
            .unwrap();

        let loaded = store.get("s1").await.unwrap().unwrap();
        assert_eq!(loaded.status, SubmissionStatus::Running);
    }
}
