#![deny(unused)]
//! Reference store implementations for CodeJudge.
//!
//! In-memory stores back tests and single-node deployments; the Redis
//! work queue is the production job feed. The relational store proper is
//! an external collaborator; these implementations honor the same
//! contracts (last-write-wins status updates, unique-key upserts, the
//! atomic grant+total pair).

pub mod memory;
pub mod redis;

pub use memory::{
    InMemoryChallengeStore, InMemoryProgressStore, InMemorySubmissionStore, InMemoryWorkQueue,
    InMemoryXpLedger,
};
pub use self::redis::RedisWorkQueue;
