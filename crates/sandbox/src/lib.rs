#![deny(unused)]
//! Sandboxed execution for CodeJudge.
//!
//! This crate turns `(code, language profile, stdin, limits)` into a
//! classified execution result. Each invocation runs inside an ephemeral
//! Docker container with no network, a hard memory cap, one CPU core,
//! and a bounded process count, driven through the `bollard` crate.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │  Test Harness (one submission)         │
//! │    ↓ per test case                     │
//! ├────────────────────────────────────────┤
//! │  SandboxEngine (DockerSandbox)         │
//! │    ↓ Docker API via bollard            │
//! ├────────────────────────────────────────┤
//! │  Container (ephemeral, isolated)       │
//! │    /workspace  (source, ro at runtime) │
//! │    No network, no swap, pids capped    │
//! └────────────────────────────────────────┘
//! ```

pub mod engine;
pub mod profile;

pub use engine::{
    DockerSandbox, ExecutionRequest, ExecutionResult, MockSandbox, SandboxEngine, SandboxSettings,
};
pub use profile::{resolve, LanguageProfile};
