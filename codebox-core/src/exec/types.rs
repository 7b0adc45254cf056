use crate::language::Language;
use serde::{Deserialize, Serialize};

/// What the caller hands the gateway: the active file's language and
/// source, plus whatever stdin the user provided.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub language: Language,
    pub code: String,
    pub stdin: String,
}

impl ExecutionRequest {
    pub fn new(language: Language, code: impl Into<String>) -> Self {
        Self {
            language,
            code: code.into(),
            stdin: String::new(),
        }
    }

    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = stdin.into();
        self
    }
}

/// Normalized outcome. Always well-formed: faults of any kind land here
/// with `success == false`, never as an error the caller must catch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub output: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

// ---- provider wire shapes ----

/// Request body in the execution service's shape: the remapped language
/// identifier, one named source file, stdin, and explicit resource limits.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderRequest {
    pub language: String,
    pub version: String,
    pub files: Vec<ProviderFile>,
    pub stdin: String,
    pub compile_timeout: u64,
    pub run_timeout: u64,
    pub compile_memory_limit: i64,
    pub run_memory_limit: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderFile {
    pub name: String,
    pub content: String,
}

/// Response fields the gateway consumes; anything else the service sends
/// is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderResponse {
    pub compile: Option<ProviderPhase>,
    pub run: Option<ProviderPhase>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderPhase {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub code: Option<i32>,
}
