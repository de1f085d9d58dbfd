//! Sandbox execution engine.
//!
//! The `SandboxEngine` trait abstracts one isolated execution of a code
//! artifact; `DockerSandbox` implements it over the Docker API via
//! `bollard`. Every invocation builds an ephemeral workspace, optionally
//! compiles, runs with hard resource limits, and tears everything down on
//! all exit paths.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use judge_core::{Error, ExecutionOutcome, Result};

use crate::profile::LanguageProfile;

/// Working directory mounted into every container.
const WORKDIR: &str = "/workspace";

/// Process cap for run containers; generous for legitimate programs,
/// fatal for fork bombs.
const RUN_PIDS_LIMIT: i64 = 50;

// =============================================================================
// Request / Result Types
// =============================================================================

/// One sandbox invocation: a code artifact plus the limits it runs under.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// Submitted source text.
    pub code: String,
    /// Execution profile resolved from the language registry.
    pub profile: &'static LanguageProfile,
    /// Delivered once on stdin before input is closed. May be empty.
    pub stdin: String,
    /// Base time limit in milliseconds.
    pub time_limit_ms: u64,
    /// Hard memory cap in MiB for the run phase.
    pub memory_limit_mb: u64,
}

impl ExecutionRequest {
    /// Run-phase budget: base limit scaled by the profile multiplier.
    pub fn effective_run_timeout_ms(&self) -> u64 {
        (self.time_limit_ms as f64 * self.profile.timeout_multiplier).round() as u64
    }
}

/// Classified result of one sandbox invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub outcome: ExecutionOutcome,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i64>,
    pub elapsed_ms: u64,
}

impl ExecutionResult {
    pub fn success(stdout: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            outcome: ExecutionOutcome::Success,
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
            elapsed_ms,
        }
    }

    pub fn compile_error(stderr: impl Into<String>, elapsed_ms: u64) -> Self {
        let stderr = stderr.into();
        let stderr = if stderr.is_empty() {
            "Compilation failed".to_string()
        } else {
            stderr
        };
        Self {
            outcome: ExecutionOutcome::CompileError,
            stdout: String::new(),
            stderr,
            exit_code: None,
            elapsed_ms,
        }
    }

    pub fn runtime_error(
        exit_code: i64,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            outcome: ExecutionOutcome::RuntimeError,
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code: Some(exit_code),
            elapsed_ms,
        }
    }

    /// The run outlived its budget; `elapsed_ms` is the effective budget
    /// itself since the program never finished.
    pub fn time_limit_exceeded(effective_timeout_ms: u64) -> Self {
        Self {
            outcome: ExecutionOutcome::TimeLimitExceeded,
            stdout: String::new(),
            stderr: "Time limit exceeded".to_string(),
            exit_code: None,
            elapsed_ms: effective_timeout_ms,
        }
    }

    pub fn infrastructure(message: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            outcome: ExecutionOutcome::InfrastructureError,
            stdout: String::new(),
            stderr: message.into(),
            exit_code: None,
            elapsed_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == ExecutionOutcome::Success
    }
}

/// Classify a finished run phase by exit code.
fn classify_run(exit_code: i64, stdout: String, stderr: String, elapsed_ms: u64) -> ExecutionResult {
    if exit_code == 0 {
        ExecutionResult {
            outcome: ExecutionOutcome::Success,
            stdout,
            stderr,
            exit_code: Some(0),
            elapsed_ms,
        }
    } else {
        ExecutionResult {
            outcome: ExecutionOutcome::RuntimeError,
            stdout,
            stderr,
            exit_code: Some(exit_code),
            elapsed_ms,
        }
    }
}

fn elapsed_ms(started: &Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

// =============================================================================
// Sandbox Engine Trait
// =============================================================================

/// One isolated execution of a code artifact.
///
/// Every failure mode is encoded in the returned [`ExecutionResult`]:
/// infrastructure faults surface as `InfrastructureError`, never as a
/// panic or a lost container.
#[async_trait]
pub trait SandboxEngine: Send + Sync {
    /// Execute the request once under isolation.
    async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult;

    /// Whether the backing engine is reachable (e.g. Docker daemon up).
    async fn is_available(&self) -> bool;
}

// =============================================================================
// Docker Sandbox Implementation
// =============================================================================

/// Tunables for the Docker sandbox.
#[derive(Debug, Clone)]
pub struct SandboxSettings {
    /// Memory ceiling for compile containers in MiB. Fixed and above run
    /// ceilings: build tooling needs headroom the graded program never
    /// gets.
    pub compile_memory_limit_mb: u64,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            compile_memory_limit_mb: 512,
        }
    }
}

/// What a finished (or expired) container produced.
enum RawOutcome {
    Completed {
        exit_code: i64,
        stdout: String,
        stderr: String,
    },
    TimedOut,
}

/// Everything needed to launch one phase container.
struct ContainerSpec<'a> {
    image: &'a str,
    argv: &'static [&'static str],
    workspace: &'a Path,
    memory_limit_mb: u64,
    /// Run-phase hardening: read-only bind and rootfs, no swap, one CPU,
    /// pids cap, dropped capabilities. Compile containers keep a writable
    /// workspace and the relaxed memory ceiling instead.
    hardened: bool,
    stdin: Option<&'a str>,
    timeout: Duration,
}

/// Docker-based sandbox engine using the `bollard` crate.
///
/// Owns one client handle to the daemon; construct it once at startup and
/// share it via `Arc`. Dropping the engine drops the connection, which is
/// the shutdown path; containers never outlive their `execute` call.
pub struct DockerSandbox {
    docker: bollard::Docker,
    settings: SandboxSettings,
}

impl DockerSandbox {
    /// Connect to the local Docker daemon.
    pub fn new(settings: SandboxSettings) -> Result<Self> {
        let docker = bollard::Docker::connect_with_local_defaults().map_err(|e| {
            Error::sandbox(format!(
                "Failed to connect to Docker daemon: {}. Is Docker running?",
                e
            ))
        })?;
        Ok(Self { docker, settings })
    }

    /// Create from an existing bollard client (for testing).
    pub fn from_client(docker: bollard::Docker, settings: SandboxSettings) -> Self {
        Self { docker, settings }
    }

    async fn try_execute(
        &self,
        request: &ExecutionRequest,
        started: &Instant,
    ) -> Result<ExecutionResult> {
        let profile = request.profile;

        // Ephemeral workspace holding only the source file. The TempDir
        // guard removes it on every return path below.
        let workspace = tempfile::Builder::new()
            .prefix("codejudge-")
            .tempdir()
            .map_err(|e| Error::sandbox(format!("Failed to create workspace: {}", e)))?;

        let source_path = workspace.path().join(profile.source_file_name);
        tokio::fs::write(&source_path, &request.code)
            .await
            .map_err(|e| Error::sandbox(format!("Failed to write source file: {}", e)))?;

        if let Some(compile_argv) = profile.compile_argv {
            // Compilation gets twice the base limit regardless of the
            // profile multiplier, and a relaxed memory ceiling.
            let spec = ContainerSpec {
                image: profile.runtime_image,
                argv: compile_argv,
                workspace: workspace.path(),
                memory_limit_mb: self.settings.compile_memory_limit_mb,
                hardened: false,
                stdin: None,
                timeout: Duration::from_millis(request.time_limit_ms.saturating_mul(2)),
            };

            match self.launch(spec).await? {
                RawOutcome::TimedOut => {
                    return Ok(ExecutionResult::compile_error(
                        "Compilation timed out",
                        elapsed_ms(started),
                    ));
                }
                RawOutcome::Completed {
                    exit_code, stderr, ..
                } if exit_code != 0 => {
                    return Ok(ExecutionResult::compile_error(stderr, elapsed_ms(started)));
                }
                RawOutcome::Completed { .. } => {}
            }
        }

        let effective_timeout_ms = request.effective_run_timeout_ms();
        let spec = ContainerSpec {
            image: profile.runtime_image,
            argv: profile.run_argv,
            workspace: workspace.path(),
            memory_limit_mb: request.memory_limit_mb,
            hardened: true,
            stdin: Some(&request.stdin),
            timeout: Duration::from_millis(effective_timeout_ms),
        };

        match self.launch(spec).await? {
            RawOutcome::TimedOut => Ok(ExecutionResult::time_limit_exceeded(effective_timeout_ms)),
            RawOutcome::Completed {
                exit_code,
                stdout,
                stderr,
            } => Ok(classify_run(exit_code, stdout, stderr, elapsed_ms(started))),
        }
    }

    /// Launch one phase container and always remove it afterwards,
    /// whichever way the phase ended.
    async fn launch(&self, spec: ContainerSpec<'_>) -> Result<RawOutcome> {
        use bollard::container::{Config, CreateContainerOptions};
        use bollard::models::HostConfig;

        self.ensure_image(spec.image).await?;

        let name = format!("judge-{}", uuid::Uuid::new_v4());

        let bind = if spec.hardened {
            format!("{}:{}:ro", spec.workspace.display(), WORKDIR)
        } else {
            format!("{}:{}", spec.workspace.display(), WORKDIR)
        };

        let memory_bytes = (spec.memory_limit_mb * 1024 * 1024) as i64;
        let mut host_config = HostConfig {
            binds: Some(vec![bind]),
            memory: Some(memory_bytes),
            network_mode: Some("none".to_string()),
            ..Default::default()
        };
        if spec.hardened {
            // memory_swap == memory means no swap at all.
            host_config.memory_swap = Some(memory_bytes);
            host_config.nano_cpus = Some(1_000_000_000);
            host_config.readonly_rootfs = Some(true);
            host_config.pids_limit = Some(RUN_PIDS_LIMIT);
            host_config.cap_drop = Some(vec!["ALL".to_string()]);
            host_config.security_opt = Some(vec!["no-new-privileges:true".to_string()]);
        }

        let config = Config {
            image: Some(spec.image.to_string()),
            cmd: Some(spec.argv.iter().map(|s| s.to_string()).collect()),
            working_dir: Some(WORKDIR.to_string()),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            open_stdin: Some(spec.stdin.is_some()),
            stdin_once: Some(spec.stdin.is_some()),
            tty: Some(false),
            host_config: Some(host_config),
            labels: Some(HashMap::from([(
                "managed-by".to_string(),
                "codejudge-sandbox".to_string(),
            )])),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: name.as_str(),
            platform: None,
        };

        self.docker
            .create_container(Some(options), config)
            .await
            .map_err(|e| Error::sandbox(format!("Failed to create container: {}", e)))?;

        let outcome = self.drive(&name, &spec).await;

        // Teardown happens on every path, including timeouts and attach
        // failures; force removal kills a still-running container.
        self.remove(&name).await;

        outcome
    }

    /// Attach, start, feed stdin once, demultiplex output, and wait for
    /// the exit code, all bounded by the phase timeout.
    async fn drive(&self, name: &str, spec: &ContainerSpec<'_>) -> Result<RawOutcome> {
        use bollard::container::{
            AttachContainerOptions, AttachContainerResults, LogOutput, StartContainerOptions,
        };

        let attach_options = AttachContainerOptions::<String> {
            stdin: Some(spec.stdin.is_some()),
            stdout: Some(true),
            stderr: Some(true),
            stream: Some(true),
            ..Default::default()
        };

        // Attach before starting so no early output is lost.
        let AttachContainerResults {
            mut output,
            mut input,
        } = self
            .docker
            .attach_container(name, Some(attach_options))
            .await
            .map_err(|e| Error::sandbox(format!("Failed to attach to container: {}", e)))?;

        self.docker
            .start_container(name, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| Error::sandbox(format!("Failed to start container: {}", e)))?;

        let stdin_data = spec.stdin.unwrap_or_default().to_string();

        let run_to_completion = async move {
            if !stdin_data.is_empty() {
                // The program may exit without draining stdin; a broken
                // pipe here is not an infrastructure fault.
                let _ = input.write_all(stdin_data.as_bytes()).await;
            }
            let _ = input.shutdown().await;
            drop(input);

            let mut stdout = String::new();
            let mut stderr = String::new();

            // The transport multiplexes both streams over one channel,
            // tagged per chunk by origin; bollard surfaces the tag as the
            // LogOutput variant.
            while let Some(chunk) = output.next().await {
                match chunk {
                    Ok(LogOutput::StdOut { message }) => {
                        stdout.push_str(&String::from_utf8_lossy(&message));
                    }
                    Ok(LogOutput::StdErr { message }) => {
                        stderr.push_str(&String::from_utf8_lossy(&message));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::debug!(container = %name, error = %e, "attach stream ended");
                        break;
                    }
                }
            }

            let exit_code = self.wait_exit_code(name).await;
            (exit_code, stdout, stderr)
        };

        // Cancellation race: whichever side resolves first wins. A lost
        // timer is simply dropped; a lost sandbox is torn down by the
        // caller's force-remove.
        match tokio::time::timeout(spec.timeout, run_to_completion).await {
            Ok((exit_code, stdout, stderr)) => Ok(RawOutcome::Completed {
                exit_code,
                stdout,
                stderr,
            }),
            Err(_) => {
                tracing::warn!(container = %name, timeout_ms = spec.timeout.as_millis() as u64, "sandbox timed out");
                Ok(RawOutcome::TimedOut)
            }
        }
    }

    async fn wait_exit_code(&self, name: &str) -> i64 {
        use bollard::container::WaitContainerOptions;

        let mut wait = self.docker.wait_container(
            name,
            Some(WaitContainerOptions {
                condition: "not-running",
            }),
        );

        match wait.next().await {
            Some(Ok(response)) => response.status_code,
            Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => code,
            Some(Err(e)) => {
                tracing::warn!(container = %name, error = %e, "container wait failed");
                -1
            }
            None => -1,
        }
    }

    async fn remove(&self, name: &str) {
        use bollard::container::RemoveContainerOptions;

        if let Err(e) = self
            .docker
            .remove_container(
                name,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
        {
            tracing::warn!(container = %name, error = %e, "failed to remove container");
        }
    }

    /// Pull the runtime image if the daemon does not have it yet.
    async fn ensure_image(&self, image: &str) -> Result<()> {
        use bollard::image::CreateImageOptions;

        if self.docker.inspect_image(image).await.is_ok() {
            return Ok(());
        }

        tracing::info!(image = %image, "pulling runtime image");
        let options = Some(CreateImageOptions {
            from_image: image,
            ..Default::default()
        });

        let mut stream = self.docker.create_image(options, None, None);
        while let Some(step) = stream.next().await {
            step.map_err(|e| Error::sandbox(format!("Failed to pull image {}: {}", image, e)))?;
        }

        Ok(())
    }
}

#[async_trait]
impl SandboxEngine for DockerSandbox {
    async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let started = Instant::now();
        match self.try_execute(request, &started).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    language = request.profile.id,
                    error = %err,
                    "sandbox infrastructure failure"
                );
                ExecutionResult::infrastructure(err.to_string(), elapsed_ms(&started))
            }
        }
    }

    async fn is_available(&self) -> bool {
        self.docker.ping().await.is_ok()
    }
}

// =============================================================================
// Mock Sandbox (for testing without Docker)
// =============================================================================

/// Scripted sandbox for unit and integration tests.
///
/// Pops one result per `execute` call and records the stdin each call
/// carried, so tests can assert traversal order. An exhausted queue
/// yields a default empty success.
#[derive(Default)]
pub struct MockSandbox {
    results: Mutex<Vec<ExecutionResult>>,
    stdins: Mutex<Vec<String>>,
}

impl MockSandbox {
    pub fn new(results: Vec<ExecutionResult>) -> Self {
        Self {
            results: Mutex::new(results),
            stdins: Mutex::new(Vec::new()),
        }
    }

    /// Stdin of every execution so far, in call order.
    pub fn recorded_stdins(&self) -> Vec<String> {
        self.stdins.lock().unwrap().clone()
    }

    /// Number of executions so far.
    pub fn call_count(&self) -> usize {
        self.stdins.lock().unwrap().len()
    }
}

#[async_trait]
impl SandboxEngine for MockSandbox {
    async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        self.stdins.lock().unwrap().push(request.stdin.clone());

        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            ExecutionResult::success("", 1)
        } else {
            results.remove(0)
        }
    }

    async fn is_available(&self) -> bool {
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
