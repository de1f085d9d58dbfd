#![deny(unused)]
//! Core types, traits, and error definitions for CodeJudge.
//!
//! This crate provides the shared vocabulary of the grading pipeline:
//! submission and challenge types, the error taxonomy, capability traits
//! for stores/queues/notifications, callback signing, and configuration.

pub mod config;
pub mod error;
pub mod events;
pub mod mocks;
pub mod signing;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use events::*;
pub use traits::*;
pub use types::*;
