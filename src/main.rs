#![deny(unused)]
//! CodeJudge - sandboxed code-grading worker.
//!
//! Wires configuration, stores, the Docker sandbox engine, and the worker
//! pool together, then processes execution jobs until shutdown.

use std::sync::Arc;

use judge_core::config::AppConfig;
use judge_core::traits::{ChallengeStore, EventPublisher, ProgressStore, SubmissionStore, WorkQueue, XpLedger};
use judge_core::NoOpPublisher;
use judge_harness::TestHarness;
use judge_sandbox::{DockerSandbox, SandboxEngine, SandboxSettings};
use judge_store::{
    InMemoryChallengeStore, InMemoryProgressStore, InMemorySubmissionStore, InMemoryWorkQueue,
    InMemoryXpLedger, RedisWorkQueue,
};
use judge_worker::{run_worker_pool, ExecutionProcessor, RewardService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    judge_worker::configure_tracing()?;

    let config = AppConfig::load()?;
    tracing::info!(
        workers = config.worker.count,
        "Starting CodeJudge v{}",
        env!("CARGO_PKG_VERSION")
    );

    // =========================================================================
    // Stores
    // =========================================================================
    let submissions: Arc<dyn SubmissionStore> = Arc::new(InMemorySubmissionStore::new());
    let challenges: Arc<dyn ChallengeStore> = Arc::new(InMemoryChallengeStore::new());
    let progress: Arc<dyn ProgressStore> = Arc::new(InMemoryProgressStore::new());
    let xp: Arc<dyn XpLedger> = Arc::new(InMemoryXpLedger::new());

    let queue: Arc<dyn WorkQueue> = match &config.queue.redis_url {
        Some(url) => {
            tracing::info!(url = %url, key = %config.queue.key, "Initializing Redis work queue");
            Arc::new(RedisWorkQueue::new(url, &config.queue.key)?)
        }
        None => {
            tracing::info!("Initializing in-memory work queue");
            Arc::new(InMemoryWorkQueue::new())
        }
    };

    // =========================================================================
    // Sandbox engine
    // =========================================================================
    // One explicitly-owned client handle to the daemon, shared by every
    // worker; dropping it at exit is the shutdown path.
    let settings = SandboxSettings {
        compile_memory_limit_mb: config.sandbox.compile_memory_limit_mb,
    };
    let engine = Arc::new(DockerSandbox::new(settings)?);
    if engine.is_available().await {
        tracing::info!("Sandbox engine initialized (Docker available)");
    } else {
        tracing::warn!(
            "Docker daemon not reachable; submissions will fail with infrastructure errors"
        );
    }

    // =========================================================================
    // Processor & worker pool
    // =========================================================================
    let events: Arc<dyn EventPublisher> = Arc::new(NoOpPublisher);
    let processor = Arc::new(ExecutionProcessor::new(
        TestHarness::new(engine),
        submissions,
        challenges,
        RewardService::new(progress, xp),
        events,
    ));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let pool = tokio::spawn(run_worker_pool(
        config.worker.count,
        queue,
        processor,
        shutdown_rx,
    ));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, draining workers");
    let _ = shutdown_tx.send(true);
    pool.await?;

    tracing::info!("CodeJudge stopped");
    Ok(())
}
