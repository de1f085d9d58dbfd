//! Error types for CodeJudge.

use thiserror::Error;

/// Result type alias using CodeJudge's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the grading pipeline.
///
/// Variants map onto the taxonomy the Submission State Machine cares
/// about: `UnsupportedLanguage` and `MissingTestData` are rejected before
/// any sandbox work, `CompileRejected` is a terminal per-submission
/// outcome, and `Sandbox` marks infrastructure-level failures that are
/// distinct from anything the submitted code did.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Input rejection
    // =========================================================================
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Missing test data: {0}")]
    MissingTestData(String),

    // =========================================================================
    // Grading outcomes surfaced as errors
    // =========================================================================
    /// The submitted source failed to compile; carries the compiler stderr.
    #[error("Compilation failed: {0}")]
    CompileRejected(String),

    // =========================================================================
    // Infrastructure
    // =========================================================================
    /// The isolation environment itself could not be created or driven.
    #[error("Sandbox failure: {0}")]
    Sandbox(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Signing error: {0}")]
    Signing(String),

    // =========================================================================
    // Generic
    // =========================================================================
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create an unsupported-language error.
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }

    /// Create a missing-test-data error.
    pub fn missing_test_data(msg: impl Into<String>) -> Self {
        Self::MissingTestData(msg.into())
    }

    /// Create a compile-rejected error carrying compiler stderr.
    pub fn compile_rejected(stderr: impl Into<String>) -> Self {
        Self::CompileRejected(stderr.into())
    }

    /// Create a sandbox (infrastructure) error.
    pub fn sandbox(msg: impl Into<String>) -> Self {
        Self::Sandbox(msg.into())
    }

    /// Create a storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a queue error.
    pub fn queue(msg: impl Into<String>) -> Self {
        Self::Queue(msg.into())
    }

    /// Create a signing error.
    pub fn signing(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }
}
