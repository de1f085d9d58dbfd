//! End-to-end pipeline test: queue → worker → state machine → stores,
//! over the scripted sandbox. No Docker or Redis required.

use std::sync::Arc;
use std::time::Duration;

use judge_core::mocks::RecordingPublisher;
use judge_core::traits::{ProgressStore, SubmissionStore, WorkQueue, XpLedger};
use judge_core::{Challenge, ExecutionJob, Submission, SubmissionStatus, TestCase};
use judge_harness::TestHarness;
use judge_sandbox::{ExecutionResult, MockSandbox};
use judge_store::{
    InMemoryChallengeStore, InMemoryProgressStore, InMemorySubmissionStore, InMemoryWorkQueue,
    InMemoryXpLedger,
};
use judge_worker::{run_worker_pool, ExecutionProcessor, RewardService};

#[tokio::test(flavor = "multi_thread")]
async fn test_job_flows_from_queue_to_terminal_record() {
    let submissions = Arc::new(InMemorySubmissionStore::new());
    let challenges = Arc::new(InMemoryChallengeStore::new());
    let progress = Arc::new(InMemoryProgressStore::new());
    let xp = Arc::new(InMemoryXpLedger::new());
    let events = Arc::new(RecordingPublisher::new());
    let queue = Arc::new(InMemoryWorkQueue::new());

    challenges.insert(
        Challenge {
            id: "two-sum".to_string(),
            title: "Two Sum".to_string(),
            time_limit_ms: 3000,
            memory_limit_mb: 256,
            xp_reward: 75,
        },
        vec![
            TestCase::new("5\n3", "8"),
            TestCase::new("2\n2", "4").hidden().with_weight(2.0),
        ],
    );

    submissions
        .insert(Submission::pending("sub-42", "user-7", "two-sum", "python"))
        .await
        .unwrap();

    queue
        .enqueue(ExecutionJob {
            submission_id: "sub-42".to_string(),
            challenge_id: "two-sum".to_string(),
            code: "print(sum(map(int, input().split())))".to_string(),
            language: "python".to_string(),
            user_id: "user-7".to_string(),
        })
        .await
        .unwrap();

    let engine = Arc::new(MockSandbox::new(vec![
        ExecutionResult::success("8\n", 10),
        ExecutionResult::success("4\n", 11),
    ]));
    let processor = Arc::new(ExecutionProcessor::new(
        TestHarness::new(engine),
        submissions.clone(),
        challenges.clone(),
        RewardService::new(progress.clone(), xp.clone()),
        events.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let pool = tokio::spawn(run_worker_pool(
        2,
        queue.clone(),
        processor,
        shutdown_rx,
    ));

    // Wait for the worker to reach the terminal record.
    let mut terminal = None;
    for _ in 0..50 {
        let loaded = submissions.get("sub-42").await.unwrap().unwrap();
        if loaded.status.is_terminal() {
            terminal = Some(loaded);
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    let _ = shutdown_tx.send(true);
    pool.await.unwrap();

    let record = terminal.expect("submission should reach a terminal state");
    assert_eq!(record.status, SubmissionStatus::Success);
    assert_eq!(record.score, 100);
    assert_eq!(record.execution_time_ms, 21);
    assert_eq!(record.test_results.len(), 2);

    // Rewards applied once.
    assert_eq!(xp.total_for("user-7").await.unwrap(), 75);
    let prog = progress.find("user-7", "two-sum").await.unwrap().unwrap();
    assert!(prog.completed);
    assert_eq!(prog.attempts, 1);

    // Live updates: RUNNING, two per-test events, final SUCCESS.
    assert_eq!(
        events.statuses(),
        [SubmissionStatus::Running, SubmissionStatus::Success]
    );
    assert_eq!(events.test_indices(), [0, 1]);
}
