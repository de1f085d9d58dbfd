#![deny(unused)]
//! Test harness: drives one submission across its test cases.
//!
//! The harness resolves the language profile, invokes the sandbox engine
//! once per test case in ascending weight order, and aggregates outcomes
//! into a weighted score. Every case runs regardless of earlier failures
//! so callers can stream progressive feedback; the only short-circuit is
//! a compile rejection, which aborts before any run phase.

use async_trait::async_trait;
use std::sync::Arc;

use judge_core::{Error, ExecutionOutcome, Result, TestCase, TestOutcome};
use judge_sandbox::{resolve, ExecutionRequest, SandboxEngine};

/// Resource limits one submission is graded under.
#[derive(Debug, Clone, Copy)]
pub struct ResourceLimits {
    pub time_limit_ms: u64,
    pub memory_limit_mb: u64,
}

/// Aggregated result of grading one submission.
#[derive(Debug, Clone)]
pub struct HarnessReport {
    /// Per-case outcomes in traversal order.
    pub outcomes: Vec<TestOutcome>,
    /// True only if every outcome passed.
    pub all_passed: bool,
    /// Sum of per-case execution times.
    pub total_time_ms: u64,
    /// `round(100 × passed weight / total weight)`.
    pub score: u8,
}

/// Receives each test outcome as it completes.
///
/// The state machine bridges this to the notification transport; tests
/// use it to assert ordering.
#[async_trait]
pub trait TestObserver: Send + Sync {
    async fn on_outcome(&self, index: usize, outcome: &TestOutcome);
}

/// Observer that ignores everything.
pub struct NoOpObserver;

#[async_trait]
impl TestObserver for NoOpObserver {
    async fn on_outcome(&self, _index: usize, _outcome: &TestOutcome) {}
}

/// Drives the sandbox engine across an ordered set of test cases.
pub struct TestHarness {
    engine: Arc<dyn SandboxEngine>,
}

impl TestHarness {
    pub fn new(engine: Arc<dyn SandboxEngine>) -> Self {
        Self { engine }
    }

    /// Grade `code` against `cases`.
    ///
    /// Fails with `UnsupportedLanguage` before any sandbox work, with
    /// `MissingTestData` for an empty case set, and with
    /// `CompileRejected` when the first invocation hits a compile error
    /// (later cases would only repeat it).
    pub async fn run(
        &self,
        code: &str,
        language: &str,
        cases: &[TestCase],
        limits: ResourceLimits,
        observer: &dyn TestObserver,
    ) -> Result<HarnessReport> {
        let profile = resolve(language)?;

        if cases.is_empty() {
            return Err(Error::missing_test_data("challenge has no test cases"));
        }

        // Ascending weight, stable on ties.
        let mut ordered: Vec<&TestCase> = cases.iter().collect();
        ordered.sort_by(|a, b| a.weight.partial_cmp(&b.weight).unwrap_or(std::cmp::Ordering::Equal));

        let total_weight: f64 = ordered.iter().map(|c| c.weight).sum();

        let mut outcomes = Vec::with_capacity(ordered.len());
        let mut total_time_ms = 0u64;
        let mut passed_weight = 0f64;

        for (index, case) in ordered.iter().enumerate() {
            let request = ExecutionRequest {
                code: code.to_string(),
                profile,
                stdin: case.input.clone(),
                time_limit_ms: limits.time_limit_ms,
                memory_limit_mb: limits.memory_limit_mb,
            };

            let result = self.engine.execute(&request).await;

            if result.outcome == ExecutionOutcome::CompileError {
                return Err(Error::compile_rejected(result.stderr));
            }

            let passed = result.is_success()
                && result.stdout.trim() == case.expected_output.trim();

            let error = match result.outcome {
                ExecutionOutcome::Success => None,
                _ => Some(result.stderr.clone()),
            };

            let outcome = TestOutcome {
                passed,
                outcome: result.outcome,
                input: case.input.clone(),
                expected_output: case.expected_output.clone(),
                actual_output: result.stdout.trim().to_string(),
                elapsed_ms: result.elapsed_ms,
                error,
            };

            total_time_ms += outcome.elapsed_ms;
            if passed {
                passed_weight += case.weight;
            }

            observer.on_outcome(index, &outcome).await;
            outcomes.push(outcome);
        }

        let all_passed = outcomes.iter().all(|o| o.passed);
        let score = score_from_weights(passed_weight, total_weight);

        tracing::debug!(
            cases = outcomes.len(),
            all_passed,
            score,
            total_time_ms,
            "harness run complete"
        );

        Ok(HarnessReport {
            outcomes,
            all_passed,
            total_time_ms,
            score,
        })
    }
}

/// Weighted score on the 0..=100 scale.
fn score_from_weights(passed_weight: f64, total_weight: f64) -> u8 {
    if total_weight <= 0.0 {
        return 0;
    }
    (100.0 * passed_weight / total_weight).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_rounding() {
        assert_eq!(score_from_weights(0.0, 2.0), 0);
        assert_eq!(score_from_weights(1.0, 2.0), 50);
        assert_eq!(score_from_weights(2.0, 2.0), 100);
        assert_eq!(score_from_weights(1.0, 3.0), 33);
        assert_eq!(score_from_weights(2.0, 3.0), 67);
    }

    #[test]
    fn test_score_monotonic_in_passed_weight() {
        // Raising a passing case's weight never lowers the score.
        let base = score_from_weights(2.0, 5.0);
        let heavier = score_from_weights(3.0, 6.0);
        assert!(heavier >= base);
    }
}
