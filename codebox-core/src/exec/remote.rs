use crate::exec::gateway::ExecutionBackend;
use crate::exec::types::{ProviderRequest, ProviderResponse};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// HTTP backend for the public execution service. One POST per run; the
/// gateway owns retry policy (there is none) and error shaping.
pub struct RemoteBackend {
    client: Client,
    base_url: String,
}

impl RemoteBackend {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self { client, base_url }
    }
}

#[async_trait]
impl ExecutionBackend for RemoteBackend {
    async fn execute(&self, request: ProviderRequest) -> Result<ProviderResponse> {
        debug!(language = %request.language, "dispatching execution request");

        let response = self
            .client
            .post(format!("{}/execute", self.base_url))
            .json(&request)
            .send()
            .await
            .context("execution service unreachable")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read execution response")?;

        if !status.is_success() {
            bail!("execution service returned {status}: {body}");
        }

        serde_json::from_str(&body)
            .with_context(|| format!("unexpected execution response: {body}"))
    }
}
