#![deny(unused)]
//! Submission state machine and worker pool for CodeJudge.
//!
//! Workers consume execution jobs from the queue at-least-once; the
//! processor owns every status transition and keeps all side effects safe
//! to repeat under redelivery.

pub mod pool;
pub mod processor;
pub mod rewards;
pub mod telemetry;

pub use pool::run_worker_pool;
pub use processor::ExecutionProcessor;
pub use rewards::RewardService;
pub use telemetry::configure_tracing;
