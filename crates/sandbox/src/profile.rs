//! Language registry.
//!
//! Static table mapping a language key to its execution profile. The
//! images, file names, command sequences, and timeout multipliers are a
//! compatibility surface: grading behavior depends on them, so they must
//! not drift.

use judge_core::{Error, Result};

/// Per-language execution recipe.
#[derive(Debug, Clone, Copy)]
pub struct LanguageProfile {
    /// Canonical language key (lowercase).
    pub id: &'static str,
    /// Container image the code runs in.
    pub runtime_image: &'static str,
    /// Fixed source file name inside the workspace. Languages that
    /// require a matching class name use a capitalized file.
    pub source_file_name: &'static str,
    /// Compile command, absent for interpreted languages.
    pub compile_argv: Option<&'static [&'static str]>,
    /// Run command.
    pub run_argv: &'static [&'static str],
    /// Scales the run-phase time budget; at least 1.
    pub timeout_multiplier: f64,
}

static PROFILES: &[LanguageProfile] = &[
    LanguageProfile {
        id: "python",
        runtime_image: "python:3.11-slim",
        source_file_name: "solution.py",
        compile_argv: None,
        run_argv: &["python", "solution.py"],
        timeout_multiplier: 1.0,
    },
    LanguageProfile {
        id: "javascript",
        runtime_image: "node:20-alpine",
        source_file_name: "solution.js",
        compile_argv: None,
        run_argv: &["node", "solution.js"],
        timeout_multiplier: 1.0,
    },
    LanguageProfile {
        id: "typescript",
        runtime_image: "node:20-alpine",
        source_file_name: "solution.ts",
        compile_argv: None,
        run_argv: &["ts-node", "solution.ts"],
        timeout_multiplier: 1.5,
    },
    LanguageProfile {
        id: "java",
        runtime_image: "openjdk:17-slim",
        source_file_name: "Solution.java",
        compile_argv: Some(&["javac", "Solution.java"]),
        run_argv: &["java", "Solution"],
        timeout_multiplier: 2.0,
    },
    LanguageProfile {
        id: "cpp",
        runtime_image: "gcc:13",
        source_file_name: "solution.cpp",
        compile_argv: Some(&["g++", "-o", "solution", "solution.cpp", "-std=c++17"]),
        run_argv: &["./solution"],
        timeout_multiplier: 1.5,
    },
    LanguageProfile {
        id: "c",
        runtime_image: "gcc:13",
        source_file_name: "solution.c",
        compile_argv: Some(&["gcc", "-o", "solution", "solution.c"]),
        run_argv: &["./solution"],
        timeout_multiplier: 1.5,
    },
    LanguageProfile {
        id: "go",
        runtime_image: "golang:1.21-alpine",
        source_file_name: "solution.go",
        compile_argv: None,
        run_argv: &["go", "run", "solution.go"],
        timeout_multiplier: 1.0,
    },
    LanguageProfile {
        id: "rust",
        runtime_image: "rust:1.74-slim",
        source_file_name: "solution.rs",
        compile_argv: Some(&["rustc", "solution.rs"]),
        run_argv: &["./solution"],
        timeout_multiplier: 2.0,
    },
];

/// Resolve a language key to its profile.
///
/// Lookup is case-insensitive; unknown keys fail with
/// [`Error::UnsupportedLanguage`] before any sandbox work happens.
pub fn resolve(language: &str) -> Result<&'static LanguageProfile> {
    let key = language.trim().to_ascii_lowercase();
    PROFILES
        .iter()
        .find(|p| p.id == key)
        .ok_or_else(|| Error::unsupported_language(language))
}
