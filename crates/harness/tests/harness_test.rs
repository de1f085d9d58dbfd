//! Harness integration tests over the scripted MockSandbox; no Docker
//! required.

use std::sync::Arc;

use judge_core::{Error, ExecutionOutcome, TestCase};
use judge_harness::{NoOpObserver, ResourceLimits, TestHarness};
use judge_sandbox::{ExecutionResult, MockSandbox};

const LIMITS: ResourceLimits = ResourceLimits {
    time_limit_ms: 3000,
    memory_limit_mb: 256,
};

fn harness_with(results: Vec<ExecutionResult>) -> (TestHarness, Arc<MockSandbox>) {
    let mock = Arc::new(MockSandbox::new(results));
    (TestHarness::new(mock.clone()), mock)
}

#[tokio::test]
async fn test_all_passing_scores_full() {
    let (harness, _) = harness_with(vec![
        ExecutionResult::success("8\n", 12),
        ExecutionResult::success("15", 9),
    ]);
    let cases = vec![
        TestCase::new("5\n3", "8"),
        TestCase::new("7\n8", "15"),
    ];

    let report = harness
        .run("code", "python", &cases, LIMITS, &NoOpObserver)
        .await
        .unwrap();

    assert!(report.all_passed);
    assert_eq!(report.score, 100);
    assert_eq!(report.total_time_ms, 21);
    assert!(report.outcomes.iter().all(|o| o.passed));
}

#[tokio::test]
async fn test_partial_pass_scores_by_weight() {
    // Equal weights, one of two passes: 50.
    let (harness, _) = harness_with(vec![
        ExecutionResult::success("8", 5),
        ExecutionResult::success("wrong", 5),
    ]);
    let cases = vec![TestCase::new("5\n3", "8"), TestCase::new("7\n8", "15")];

    let report = harness
        .run("code", "python", &cases, LIMITS, &NoOpObserver)
        .await
        .unwrap();

    assert!(!report.all_passed);
    assert_eq!(report.score, 50);
    assert!(report.outcomes[0].passed);
    assert!(!report.outcomes[1].passed);
    assert_eq!(report.outcomes[1].actual_output, "wrong");
}

#[tokio::test]
async fn test_every_case_runs_despite_failures() {
    let (harness, mock) = harness_with(vec![
        ExecutionResult::runtime_error(1, "", "index out of range", 4),
        ExecutionResult::time_limit_exceeded(4500),
        ExecutionResult::success("42", 6),
    ]);
    let cases = vec![
        TestCase::new("a", "1"),
        TestCase::new("b", "2"),
        TestCase::new("c", "42"),
    ];

    let report = harness
        .run("code", "python", &cases, LIMITS, &NoOpObserver)
        .await
        .unwrap();

    assert_eq!(mock.call_count(), 3, "no early exit on failing cases");
    assert_eq!(report.outcomes.len(), 3);
    assert!(!report.all_passed);
    assert!(report.outcomes[2].passed);

    assert_eq!(report.outcomes[0].outcome, ExecutionOutcome::RuntimeError);
    assert_eq!(
        report.outcomes[0].error.as_deref(),
        Some("index out of range")
    );
    assert_eq!(
        report.outcomes[1].outcome,
        ExecutionOutcome::TimeLimitExceeded
    );
    assert_eq!(report.outcomes[1].elapsed_ms, 4500);
}

#[tokio::test]
async fn test_traversal_follows_ascending_weight() {
    let (harness, mock) = harness_with(vec![
        ExecutionResult::success("", 1),
        ExecutionResult::success("", 1),
        ExecutionResult::success("", 1),
    ]);
    // Declared out of order; weights 3, 1, 2.
    let cases = vec![
        TestCase::new("heavy", "").with_weight(3.0),
        TestCase::new("light", "").with_weight(1.0),
        TestCase::new("middle", "").with_weight(2.0),
    ];

    harness
        .run("code", "python", &cases, LIMITS, &NoOpObserver)
        .await
        .unwrap();

    assert_eq!(mock.recorded_stdins(), ["light", "middle", "heavy"]);
}

#[tokio::test]
async fn test_comparison_trims_outer_whitespace_only() {
    let (harness, _) = harness_with(vec![
        ExecutionResult::success("  8\n", 1),
        ExecutionResult::success("1\n2", 1),
        ExecutionResult::success("1 2", 1),
    ]);
    let cases = vec![
        TestCase::new("", "8"),
        TestCase::new("", "1\n2\n"),
        // Internal whitespace must match exactly.
        TestCase::new("", "1  2"),
    ];

    let report = harness
        .run("code", "python", &cases, LIMITS, &NoOpObserver)
        .await
        .unwrap();

    assert!(report.outcomes[0].passed);
    assert!(report.outcomes[1].passed);
    assert!(!report.outcomes[2].passed);
}

#[tokio::test]
async fn test_total_time_is_sum_of_case_times() {
    let (harness, _) = harness_with(vec![
        ExecutionResult::success("x", 100),
        ExecutionResult::runtime_error(2, "", "crash", 250),
        ExecutionResult::success("x", 50),
    ]);
    let cases = vec![
        TestCase::new("", "x"),
        TestCase::new("", "x"),
        TestCase::new("", "x"),
    ];

    let report = harness
        .run("code", "python", &cases, LIMITS, &NoOpObserver)
        .await
        .unwrap();

    assert_eq!(report.total_time_ms, 400);
    let summed: u64 = report.outcomes.iter().map(|o| o.elapsed_ms).sum();
    assert_eq!(report.total_time_ms, summed);
}

#[tokio::test]
async fn test_compile_error_short_circuits() {
    let (harness, mock) = harness_with(vec![ExecutionResult::compile_error(
        "Solution.java:3: error: ';' expected",
        40,
    )]);
    let cases = vec![TestCase::new("1", "1"), TestCase::new("2", "2")];

    let err = harness
        .run("class Solution {", "java", &cases, LIMITS, &NoOpObserver)
        .await
        .unwrap_err();

    match err {
        Error::CompileRejected(stderr) => {
            assert!(stderr.contains("';' expected"));
        }
        other => panic!("expected CompileRejected, got {other:?}"),
    }
    assert_eq!(mock.call_count(), 1, "no run phase after compile rejection");
}

#[tokio::test]
async fn test_unsupported_language_rejected_before_execution() {
    let (harness, mock) = harness_with(vec![]);
    let cases = vec![TestCase::new("1", "1")];

    let err = harness
        .run("code", "cobol", &cases, LIMITS, &NoOpObserver)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnsupportedLanguage(_)));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_empty_case_set_rejected() {
    let (harness, _) = harness_with(vec![]);

    let err = harness
        .run("code", "python", &[], LIMITS, &NoOpObserver)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MissingTestData(_)));
}

#[tokio::test]
async fn test_infrastructure_error_recorded_not_fatal() {
    let (harness, _) = harness_with(vec![
        ExecutionResult::infrastructure("Failed to create container: daemon gone", 2),
        ExecutionResult::success("ok", 3),
    ]);
    let cases = vec![TestCase::new("", "ok"), TestCase::new("", "ok")];

    let report = harness
        .run("code", "python", &cases, LIMITS, &NoOpObserver)
        .await
        .unwrap();

    assert_eq!(
        report.outcomes[0].outcome,
        ExecutionOutcome::InfrastructureError
    );
    assert!(!report.outcomes[0].passed);
    assert!(report.outcomes[1].passed);
    assert!(!report.all_passed);
}
