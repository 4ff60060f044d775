#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

use crate::completion::{ChatMessage, CompletionClient, CompletionOutcome, interpret_response};
use crate::config::CompletionConfig;

/// Blocking client for OpenAI-compatible `chat/completions` endpoints
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    endpoint: Url,
    model: String,
    api_key: String,
    timeout: Duration,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

impl OpenAiClient {
    #[inline]
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let endpoint = config
            .endpoint_url()
            .context("Failed to parse completion endpoint from config")?;

        if !config.has_api_key() {
            warn!("No completion API key configured, requests will be unauthenticated");
        }

        let timeout = Duration::from_secs(config.timeout_seconds);

        Ok(Self {
            endpoint,
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            timeout,
            agent: Self::build_agent(timeout),
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.agent = Self::build_agent(timeout);
        self
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // Error bodies arrive with 4xx statuses; the body decides the outcome.
    fn build_agent(timeout: Duration) -> ureq::Agent {
        ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into()
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, messages: &[ChatMessage]) -> CompletionOutcome {
        let request = CompletionRequest {
            model: &self.model,
            messages,
        };

        let request_json = match serde_json::to_string(&request) {
            Ok(json) => json,
            Err(e) => return CompletionOutcome::Transport(format!("Invalid request: {}", e)),
        };

        debug!(
            "Sending {} messages to {} (model {})",
            messages.len(),
            self.endpoint,
            self.model
        );

        let mut request = self
            .agent
            .post(self.endpoint.as_str())
            .header("Content-Type", "application/json");
        if !self.api_key.is_empty() {
            request = request.header("Authorization", &format!("Bearer {}", self.api_key));
        }

        let body = request
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string());

        match body {
            Ok(body) => {
                debug!("Completion service raw response: {}", body);
                interpret_response(&body)
            }
            Err(e) => {
                error!("Completion request failed: {}", e);
                CompletionOutcome::Transport(e.to_string())
            }
        }
    }
}
