//! Notification events produced by the grading pipeline.
//!
//! Events are handed to an [`EventPublisher`](crate::traits::EventPublisher)
//! as fire-and-forget side effects; the live transport behind the seam is
//! an external collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::SubmissionStatus;

/// Status-change notification for a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionEvent {
    pub submission_id: String,
    pub timestamp: DateTime<Utc>,
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time_ms: Option<u64>,
    /// Number of passed test cases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed: Option<usize>,
    /// Total number of test cases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SubmissionEvent {
    pub fn new(submission_id: impl Into<String>, status: SubmissionStatus) -> Self {
        Self {
            submission_id: submission_id.into(),
            timestamp: Utc::now(),
            status,
            score: None,
            total_time_ms: None,
            passed: None,
            total: None,
            message: None,
        }
    }

    pub fn with_score(mut self, score: u8) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_total_time(mut self, total_time_ms: u64) -> Self {
        self.total_time_ms = Some(total_time_ms);
        self
    }

    pub fn with_counts(mut self, passed: usize, total: usize) -> Self {
        self.passed = Some(passed);
        self.total = Some(total);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Progressive per-test notification, emitted as each case completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseEvent {
    pub submission_id: String,
    /// Index in harness traversal order (ascending weight).
    pub test_index: usize,
    pub passed: bool,
    pub execution_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl TestCaseEvent {
    pub fn new(
        submission_id: impl Into<String>,
        test_index: usize,
        passed: bool,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            submission_id: submission_id.into(),
            test_index,
            passed,
            execution_time_ms,
            timestamp: Utc::now(),
        }
    }
}

/// Envelope over everything the pipeline publishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JudgeEvent {
    Submission(SubmissionEvent),
    TestCase(TestCaseEvent),
}

impl JudgeEvent {
    /// Submission ID this event refers to.
    pub fn submission_id(&self) -> &str {
        match self {
            Self::Submission(e) => &e.submission_id,
            Self::TestCase(e) => &e.submission_id,
        }
    }
}
