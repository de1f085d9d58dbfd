//! Reward side effects: XP grants and progress records.
//!
//! Both are best effort: failures are logged and swallowed so they can
//! never change a grading outcome. Both are also safe under
//! redelivery: the XP grant is guarded by the existing-completion check,
//! and the progress upsert only ever improves the record.

use serde_json::json;
use std::sync::Arc;

use judge_core::{Challenge, ExecutionJob, ProgressStore, XpGrant, XpLedger};

pub struct RewardService {
    progress: Arc<dyn ProgressStore>,
    xp: Arc<dyn XpLedger>,
}

impl RewardService {
    pub fn new(progress: Arc<dyn ProgressStore>, xp: Arc<dyn XpLedger>) -> Self {
        Self { progress, xp }
    }

    /// Side effects of a SUCCESS terminal: XP on first completion, then
    /// the progress upsert. Grant before upsert: the completion check
    /// must see the state as it was before this attempt.
    pub async fn on_success(&self, job: &ExecutionJob, challenge: &Challenge, score: u8) {
        self.grant_xp(job, challenge).await;
        self.on_graded_attempt(job, score).await;
    }

    /// Fold a graded attempt (SUCCESS or FAILED) into the user's
    /// progress record.
    pub async fn on_graded_attempt(&self, job: &ExecutionJob, score: u8) {
        match self
            .progress
            .upsert_attempt(&job.user_id, &job.challenge_id, score)
            .await
        {
            Ok(record) => {
                tracing::debug!(
                    user = %job.user_id,
                    challenge = %job.challenge_id,
                    best_score = record.best_score,
                    attempts = record.attempts,
                    "progress updated"
                );
            }
            Err(err) => {
                tracing::error!(
                    user = %job.user_id,
                    challenge = %job.challenge_id,
                    error = %err,
                    "failed to update progress"
                );
            }
        }
    }

    async fn grant_xp(&self, job: &ExecutionJob, challenge: &Challenge) {
        // Only the first full completion earns XP. A redelivered job sees
        // the completed record and skips the grant.
        match self.progress.find(&job.user_id, &job.challenge_id).await {
            Ok(Some(existing)) if existing.completed => {
                tracing::debug!(
                    user = %job.user_id,
                    challenge = %job.challenge_id,
                    "challenge already completed, skipping XP grant"
                );
                return;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::error!(
                    user = %job.user_id,
                    challenge = %job.challenge_id,
                    error = %err,
                    "failed to check completion state, skipping XP grant"
                );
                return;
            }
        }

        let grant = XpGrant {
            user_id: job.user_id.clone(),
            challenge_id: challenge.id.clone(),
            amount: challenge.xp_reward,
            reason: "challenge_completed".to_string(),
            metadata: json!({
                "challengeId": challenge.id,
                "challengeTitle": challenge.title,
                "submissionId": job.submission_id,
            }),
        };

        match self.xp.grant(grant).await {
            Ok(()) => {
                tracing::info!(
                    user = %job.user_id,
                    challenge = %challenge.id,
                    amount = challenge.xp_reward,
                    "XP granted"
                );
            }
            Err(err) => {
                tracing::error!(
                    user = %job.user_id,
                    challenge = %challenge.id,
                    error = %err,
                    "failed to grant XP"
                );
            }
        }
    }
}
