use config::{Config, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub worker: WorkerConfig,
    pub sandbox: SandboxConfig,
    pub queue: QueueConfig,
    pub signing: SigningConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkerConfig {
    /// Number of independent workers; each processes one submission at a
    /// time, end to end.
    pub count: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SandboxConfig {
    /// Memory ceiling for compile containers in MiB. Fixed and larger
    /// than run ceilings since build tooling needs headroom.
    pub compile_memory_limit_mb: u64,
    /// Fallback per-test time limit when a challenge carries none.
    pub default_time_limit_ms: u64,
    /// Fallback per-run memory cap in MiB.
    pub default_memory_limit_mb: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueueConfig {
    /// Redis connection URL; absent means the in-memory queue.
    pub redis_url: Option<String>,
    /// List key the execution jobs live under.
    pub key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SigningConfig {
    /// Shared secret for outbound callback signatures.
    pub secret: Secret<String>,
}

impl AppConfig {
    /// Load configuration from defaults, an optional `codejudge.toml`,
    /// and `CODEJUDGE__`-prefixed environment variables (highest wins).
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("worker.count", 4)?
            .set_default("sandbox.compile_memory_limit_mb", 512)?
            .set_default("sandbox.default_time_limit_ms", 5000)?
            .set_default("sandbox.default_memory_limit_mb", 256)?
            .set_default("queue.key", "codejudge:execution")?
            .set_default("signing.secret", "default-secret")?
            .add_source(File::with_name("codejudge").required(false))
            .add_source(Environment::with_prefix("CODEJUDGE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
