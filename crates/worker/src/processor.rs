//! The submission state machine.
//!
//! `PENDING → RUNNING → {SUCCESS | FAILED | ERROR}`. One processor call
//! takes a job end to end: status transition, harness run, terminal
//! classification, persistence, notifications, and reward side effects.
//! Everything here tolerates redelivery of the same job.

use async_trait::async_trait;
use std::sync::Arc;

use judge_core::{
    ChallengeStore, Error, EventPublisher, ExecutionJob, ExecutionOutcome, GradedResult,
    JudgeEvent, Result, SubmissionEvent, SubmissionStatus, SubmissionStore, TestCaseEvent,
    TestOutcome,
};
use judge_harness::{HarnessReport, ResourceLimits, TestHarness, TestObserver};

use crate::rewards::RewardService;

/// Bridges per-test outcomes onto the notification transport as each
/// case completes.
struct PublishingObserver {
    submission_id: String,
    events: Arc<dyn EventPublisher>,
}

#[async_trait]
impl TestObserver for PublishingObserver {
    async fn on_outcome(&self, index: usize, outcome: &TestOutcome) {
        self.events
            .publish(JudgeEvent::TestCase(TestCaseEvent::new(
                self.submission_id.clone(),
                index,
                outcome.passed,
                outcome.elapsed_ms,
            )))
            .await;
    }
}

/// Executes one submission job end to end.
pub struct ExecutionProcessor {
    harness: TestHarness,
    submissions: Arc<dyn SubmissionStore>,
    challenges: Arc<dyn ChallengeStore>,
    rewards: RewardService,
    events: Arc<dyn EventPublisher>,
}

impl ExecutionProcessor {
    pub fn new(
        harness: TestHarness,
        submissions: Arc<dyn SubmissionStore>,
        challenges: Arc<dyn ChallengeStore>,
        rewards: RewardService,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            harness,
            submissions,
            challenges,
            rewards,
            events,
        }
    }

    /// Process one job. Returns the terminal status reached.
    ///
    /// Safe under at-least-once delivery: status and score writes are
    /// last-write-wins and the XP grant is guarded by the
    /// existing-completion check in [`RewardService`].
    pub async fn process(&self, job: &ExecutionJob) -> Result<SubmissionStatus> {
        tracing::info!(
            submission = %job.submission_id,
            user = %job.user_id,
            language = %job.language,
            "processing submission"
        );

        self.submissions
            .set_status(&job.submission_id, SubmissionStatus::Running)
            .await?;
        self.events
            .publish(JudgeEvent::Submission(
                SubmissionEvent::new(&job.submission_id, SubmissionStatus::Running)
                    .with_message("Running code..."),
            ))
            .await;

        match self.grade(job).await {
            Ok(status) => {
                tracing::info!(
                    submission = %job.submission_id,
                    status = ?status,
                    "submission completed"
                );
                Ok(status)
            }
            Err(err) => {
                // Terminal ERROR: persist the diagnostic and notify. The
                // queue's redelivery policy decides whether to retry; the
                // core never retries on its own.
                let message = match &err {
                    Error::CompileRejected(stderr) => stderr.clone(),
                    other => other.to_string(),
                };
                tracing::error!(
                    submission = %job.submission_id,
                    error = %message,
                    "submission pipeline failed"
                );

                if let Err(store_err) = self
                    .submissions
                    .record_failure(&job.submission_id, &message)
                    .await
                {
                    tracing::error!(
                        submission = %job.submission_id,
                        error = %store_err,
                        "failed to persist error state"
                    );
                }

                self.events
                    .publish(JudgeEvent::Submission(
                        SubmissionEvent::new(&job.submission_id, SubmissionStatus::Error)
                            .with_message(message),
                    ))
                    .await;

                Ok(SubmissionStatus::Error)
            }
        }
    }

    async fn grade(&self, job: &ExecutionJob) -> Result<SubmissionStatus> {
        let challenge = self
            .challenges
            .challenge(&job.challenge_id)
            .await?
            .ok_or_else(|| {
                Error::missing_test_data(format!("challenge {} not found", job.challenge_id))
            })?;

        let cases = self.challenges.test_cases(&job.challenge_id).await?;

        let observer = PublishingObserver {
            submission_id: job.submission_id.clone(),
            events: self.events.clone(),
        };

        let limits = ResourceLimits {
            time_limit_ms: challenge.time_limit_ms,
            memory_limit_mb: challenge.memory_limit_mb,
        };

        let report = self
            .harness
            .run(&job.code, &job.language, &cases, limits, &observer)
            .await?;

        let status = classify(&report);
        let passed = report.outcomes.iter().filter(|o| o.passed).count();
        let total = report.outcomes.len();

        self.submissions
            .record_result(
                &job.submission_id,
                GradedResult {
                    status,
                    score: report.score,
                    execution_time_ms: report.total_time_ms,
                    test_results: report.outcomes.clone(),
                    error_message: infra_message(&report),
                },
            )
            .await?;

        let message = if report.all_passed {
            "All tests passed".to_string()
        } else {
            format!("Passed {} of {} tests", passed, total)
        };
        self.events
            .publish(JudgeEvent::Submission(
                SubmissionEvent::new(&job.submission_id, status)
                    .with_score(report.score)
                    .with_total_time(report.total_time_ms)
                    .with_counts(passed, total)
                    .with_message(message),
            ))
            .await;

        // Best-effort side effects: a reward failure must never flip a
        // grading outcome.
        match status {
            SubmissionStatus::Success => {
                self.rewards.on_success(job, &challenge, report.score).await;
            }
            SubmissionStatus::Failed => {
                self.rewards.on_graded_attempt(job, report.score).await;
            }
            _ => {}
        }

        Ok(status)
    }
}

/// Terminal classification of a harness report.
///
/// SUCCESS iff everything passed; ERROR iff any case died on the
/// infrastructure rather than on the submitted code; FAILED otherwise
/// (wrong output, runtime error, or timeout are the submitter's
/// problem, not ours).
fn classify(report: &HarnessReport) -> SubmissionStatus {
    if report.all_passed {
        SubmissionStatus::Success
    } else if report
        .outcomes
        .iter()
        .any(|o| o.outcome == ExecutionOutcome::InfrastructureError)
    {
        SubmissionStatus::Error
    } else {
        SubmissionStatus::Failed
    }
}

/// Diagnostic for ERROR terminals: the first infrastructure failure.
fn infra_message(report: &HarnessReport) -> Option<String> {
    report
        .outcomes
        .iter()
        .find(|o| o.outcome == ExecutionOutcome::InfrastructureError)
        .and_then(|o| o.error.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(passed: bool, kind: ExecutionOutcome) -> TestOutcome {
        TestOutcome {
            passed,
            outcome: kind,
            input: String::new(),
            expected_output: String::new(),
            actual_output: String::new(),
            elapsed_ms: 1,
            error: if passed { None } else { Some("err".into()) },
        }
    }

    fn report(outcomes: Vec<TestOutcome>) -> HarnessReport {
        let all_passed = outcomes.iter().all(|o| o.passed);
        HarnessReport {
            all_passed,
            total_time_ms: outcomes.iter().map(|o| o.elapsed_ms).sum(),
            score: 0,
            outcomes,
        }
    }

    #[test]
    fn test_classify_success() {
        let r = report(vec![outcome(true, ExecutionOutcome::Success)]);
        assert_eq!(classify(&r), SubmissionStatus::Success);
    }

    #[test]
    fn test_classify_failed_on_code_faults() {
        let r = report(vec![
            outcome(true, ExecutionOutcome::Success),
            outcome(false, ExecutionOutcome::RuntimeError),
            outcome(false, ExecutionOutcome::TimeLimitExceeded),
        ]);
        assert_eq!(classify(&r), SubmissionStatus::Failed);
    }

    #[test]
    fn test_classify_error_on_infrastructure() {
        let r = report(vec![
            outcome(true, ExecutionOutcome::Success),
            outcome(false, ExecutionOutcome::InfrastructureError),
        ]);
        assert_eq!(classify(&r), SubmissionStatus::Error);
        assert_eq!(infra_message(&r).as_deref(), Some("err"));
    }
}
