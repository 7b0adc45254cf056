use crate::exec::gateway::ExecutionBackend;
use crate::exec::types::{ProviderPhase, ProviderRequest, ProviderResponse};
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

enum Scripted {
    Response(ProviderResponse),
    Error(String),
}

/// Scripted backend for tests: pops pre-canned responses in order and
/// records every request it saw. An empty script yields an empty
/// successful run.
#[derive(Default)]
pub struct MockBackend {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: ProviderResponse) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Response(response));
    }

    pub fn push_error(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Error(message.to_string()));
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn run_ok(stdout: &str) -> ProviderResponse {
        ProviderResponse {
            compile: None,
            run: Some(ProviderPhase {
                stdout: stdout.to_string(),
                stderr: String::new(),
                code: Some(0),
            }),
        }
    }

    pub fn compile_error(stderr: &str) -> ProviderResponse {
        ProviderResponse {
            compile: Some(ProviderPhase {
                stdout: String::new(),
                stderr: stderr.to_string(),
                code: Some(1),
            }),
            run: None,
        }
    }

    pub fn run_failure(stdout: &str, stderr: &str, code: Option<i32>) -> ProviderResponse {
        ProviderResponse {
            compile: None,
            run: Some(ProviderPhase {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                code,
            }),
        }
    }
}

#[async_trait]
impl ExecutionBackend for MockBackend {
    async fn execute(&self, request: ProviderRequest) -> anyhow::Result<ProviderResponse> {
        self.requests.lock().unwrap().push(request);
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Error(message)) => Err(anyhow!("{message}")),
            None => Ok(Self::run_ok("")),
        }
    }
}
