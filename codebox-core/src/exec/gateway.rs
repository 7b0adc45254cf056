use crate::exec::remote::RemoteBackend;
use crate::exec::sanitize;
use crate::exec::types::{
    ExecutionRequest, ExecutionResult, ProviderFile, ProviderRequest, ProviderResponse,
};
use crate::persist::{keys, KvStore};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Seam between the gateway and whatever actually runs code. Production
/// uses the HTTP service; tests script a mock.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn execute(&self, request: ProviderRequest) -> Result<ProviderResponse>;
}

/// Endpoint and resource limits forwarded to the execution service. The
/// service enforces the limits; the gateway only reports what comes back.
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    pub base_url: String,
    pub compile_timeout_ms: u64,
    pub run_timeout_ms: u64,
    pub memory_limit_bytes: i64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://emkc.org/api/v2/piston".to_string(),
            compile_timeout_ms: 10_000,
            run_timeout_ms: 3_000,
            memory_limit_bytes: -1,
        }
    }
}

/// Translates `(language, code, stdin)` into a normalized result via the
/// remote execution service, and remembers the last output per file path
/// for redisplay.
pub struct ExecutionGateway {
    backend: Arc<dyn ExecutionBackend>,
    config: ExecutionConfig,
    outputs: OutputCache,
}

impl ExecutionGateway {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self::with_config(ExecutionConfig::default(), kv)
    }

    pub fn with_config(config: ExecutionConfig, kv: Arc<dyn KvStore>) -> Self {
        let backend = Arc::new(RemoteBackend::new(config.base_url.clone()));
        Self::with_backend(backend, config, kv)
    }

    pub fn with_backend(
        backend: Arc<dyn ExecutionBackend>,
        config: ExecutionConfig,
        kv: Arc<dyn KvStore>,
    ) -> Self {
        Self {
            backend,
            config,
            outputs: OutputCache { kv },
        }
    }

    /// Runs the request and normalizes the outcome. Never fails: network
    /// and service faults come back as failed results, and nothing is
    /// retried.
    pub async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        let provider_request = ProviderRequest {
            language: request.language.provider_id().to_string(),
            version: "*".to_string(),
            files: vec![ProviderFile {
                name: request.language.canonical_file_name().to_string(),
                content: request.code,
            }],
            stdin: request.stdin,
            compile_timeout: self.config.compile_timeout_ms,
            run_timeout: self.config.run_timeout_ms,
            compile_memory_limit: self.config.memory_limit_bytes,
            run_memory_limit: self.config.memory_limit_bytes,
        };

        let response = match self.backend.execute(provider_request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("execution request failed: {e:#}");
                return ExecutionResult::failed(
                    "Execution failed: could not reach the execution service",
                    e.to_string(),
                );
            }
        };
        normalize(response)
    }

    /// Runs and remembers the output under the file's path.
    pub async fn execute_for_file(
        &self,
        path: &str,
        request: ExecutionRequest,
    ) -> ExecutionResult {
        let result = self.execute(request).await;
        self.outputs.remember(path, &result.output);
        result
    }

    /// Last output recorded for a path, surviving restarts best-effort.
    pub fn cached_output(&self, path: &str) -> Option<String> {
        self.outputs.get(path)
    }

    pub fn forget_output(&self, path: &str) {
        self.outputs.forget(path);
    }
}

/// Folds the provider's compile/run phases into the caller-facing shape.
///
/// A non-empty compile stderr is a Compilation Error and the run phase is
/// not consulted. Otherwise run stdout is the output, and a non-empty run
/// stderr or a non-zero exit code marks the result failed.
fn normalize(response: ProviderResponse) -> ExecutionResult {
    if let Some(compile) = &response.compile {
        if !compile.stderr.trim().is_empty() {
            let details = sanitize::clean(&compile.stderr);
            return ExecutionResult::failed(
                format!("Compilation Error:\n{details}"),
                "compilation failed",
            );
        }
    }

    let Some(run) = response.run else {
        return ExecutionResult::failed(
            "Execution failed: the service returned no run result",
            "missing run phase",
        );
    };

    let stdout = sanitize::clean_output(&run.stdout);
    let stderr = sanitize::clean(&run.stderr);

    if !stderr.is_empty() {
        let output = if stdout.is_empty() {
            stderr.clone()
        } else {
            format!("{stdout}\n{stderr}")
        };
        return ExecutionResult::failed(output, stderr);
    }

    let code = run.code.unwrap_or(0);
    if code != 0 {
        let output = if stdout.is_empty() {
            format!("Process exited with code {code}")
        } else {
            stdout
        };
        return ExecutionResult::failed(output, format!("exit code {code}"));
    }

    ExecutionResult::ok(stdout)
}

/// Best-effort per-file cache of the last run's output, persisted as one
/// JSON document keyed by file path. Cache failures are invisible.
struct OutputCache {
    kv: Arc<dyn KvStore>,
}

impl OutputCache {
    fn read(&self) -> HashMap<String, String> {
        let Some(raw) = self.kv.get(keys::OUTPUTS) else {
            return HashMap::new();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }

    fn remember(&self, path: &str, output: &str) {
        let mut outputs = self.read();
        outputs.insert(path.to_string(), output.to_string());
        match serde_json::to_string(&outputs) {
            Ok(json) => self.kv.set(keys::OUTPUTS, &json),
            Err(e) => warn!("failed to serialize output cache: {e}"),
        }
    }

    fn get(&self, path: &str) -> Option<String> {
        self.read().remove(path)
    }

    fn forget(&self, path: &str) {
        let mut outputs = self.read();
        if outputs.remove(path).is_some() {
            match serde_json::to_string(&outputs) {
                Ok(json) => self.kv.set(keys::OUTPUTS, &json),
                Err(e) => warn!("failed to serialize output cache: {e}"),
            }
        }
    }
}
