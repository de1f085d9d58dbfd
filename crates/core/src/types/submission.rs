use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Submission & Grading Types
// =============================================================================

/// Lifecycle status of a submission.
///
/// `Pending` is set by the external enqueuer; every other transition is
/// owned by the state machine. `Success`, `Failed`, and `Error` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    /// Enqueued, not yet picked up by a worker.
    Pending,
    /// A worker is executing the submission.
    Running,
    /// Every test case passed.
    Success,
    /// At least one test case failed on its own merits.
    Failed,
    /// The pipeline itself failed (infrastructure, missing data, compile).
    Error,
}

impl SubmissionStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Error)
    }
}

/// Classification of one sandbox execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionOutcome {
    /// Exit code 0.
    Success,
    /// The compile step exited non-zero (or timed out).
    CompileError,
    /// The run step exited non-zero.
    RuntimeError,
    /// The run step outlived its effective time budget.
    TimeLimitExceeded,
    /// The isolation environment could not be created or driven.
    InfrastructureError,
}

/// Result of judging one test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Whether the execution succeeded and the output matched.
    pub passed: bool,
    /// Classification of the underlying execution.
    pub outcome: ExecutionOutcome,
    /// Input fed to the program on stdin.
    pub input: String,
    /// Expected output from the test case.
    pub expected_output: String,
    /// Actual stdout, trimmed of leading/trailing whitespace.
    pub actual_output: String,
    /// Wall-clock time of the execution in milliseconds.
    pub elapsed_ms: u64,
    /// Diagnostic for non-success outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A graded submission record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Unique submission ID.
    pub id: String,

    /// Owner of the submission.
    pub user_id: String,

    /// Challenge the submission answers.
    pub challenge_id: String,

    /// Language key, resolved against the registry at execution time.
    pub language: String,

    /// Current lifecycle status.
    pub status: SubmissionStatus,

    /// Weighted score, 0..=100.
    pub score: u8,

    /// Sum of per-test execution times in milliseconds.
    pub execution_time_ms: u64,

    /// Per-test outcomes in harness traversal order.
    pub test_results: Vec<TestOutcome>,

    /// Populated for `Error` terminals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// Create a fresh `Pending` submission, the shape the external
    /// enqueuer persists before a worker picks the job up.
    pub fn pending(
        id: impl Into<String>,
        user_id: impl Into<String>,
        challenge_id: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            challenge_id: challenge_id.into(),
            language: language.into(),
            status: SubmissionStatus::Pending,
            score: 0,
            execution_time_ms: 0,
            test_results: Vec::new(),
            error_message: None,
            created_at: Utc::now(),
        }
    }
}

/// Terminal grading payload written back by the state machine.
#[derive(Debug, Clone)]
pub struct GradedResult {
    pub status: SubmissionStatus,
    pub score: u8,
    pub execution_time_ms: u64,
    pub test_results: Vec<TestOutcome>,
    pub error_message: Option<String>,
}
