use serde::{Deserialize, Serialize};

/// One test case of a challenge.
///
/// The harness traverses cases in ascending `weight` order; ties keep
/// their stored order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    /// Text delivered to the program on stdin.
    pub input: String,
    /// Expected stdout, compared after trimming outer whitespace.
    pub expected_output: String,
    /// Whether the case is visible to the submitter.
    pub is_public: bool,
    /// Positive weight; the score is the passed fraction of total weight.
    pub weight: f64,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
            is_public: true,
            weight: 1.0,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_public = false;
        self
    }
}

/// Grading parameters of a challenge.
///
/// Content management owns the rest of the challenge record; the grading
/// core only consumes the fields that drive execution and rewards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    /// Unique challenge ID.
    pub id: String,
    /// Display title, carried into XP grant metadata.
    pub title: String,
    /// Base time limit per test case in milliseconds.
    pub time_limit_ms: u64,
    /// Hard memory cap per run in MiB.
    pub memory_limit_mb: u64,
    /// XP awarded on first full completion.
    pub xp_reward: u64,
}
