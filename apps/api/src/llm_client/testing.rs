//! Scripted in-memory transport for exercising the client without a network.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::transport::{ChatCompletionRequest, ChatTransport, ProviderResponse};
use super::LlmError;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    /// (role, content) pairs in order.
    pub messages: Vec<(String, String)>,
}

/// Replays a fixed list of responses, one per `send`, recording every call.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<ProviderResponse, LlmError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    spans: Mutex<Vec<(Instant, Instant)>>,
    latency: Duration,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<ProviderResponse, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            spans: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
        }
    }

    /// Every call takes `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn status(status: u16, body: &str) -> Result<ProviderResponse, LlmError> {
        Ok(ProviderResponse {
            status,
            retry_after: None,
            body: body.to_string(),
        })
    }

    pub fn status_with_retry_after(
        status: u16,
        body: &str,
        retry_after: Duration,
    ) -> Result<ProviderResponse, LlmError> {
        Ok(ProviderResponse {
            status,
            retry_after: Some(retry_after),
            body: body.to_string(),
        })
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn dispatch_times(&self) -> Vec<Instant> {
        self.spans.lock().unwrap().iter().map(|(start, _)| *start).collect()
    }

    /// (dispatched, settled) per call.
    pub fn spans(&self) -> Vec<(Instant, Instant)> {
        self.spans.lock().unwrap().clone()
    }
}

/// A 200 response whose first choice carries `content`.
pub fn ok_completion(content: &str) -> Result<ProviderResponse, LlmError> {
    let body = serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 12, "completion_tokens": 34}
    });
    ScriptedTransport::status(200, &body.to_string())
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(
        &self,
        endpoint: &str,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ProviderResponse, LlmError> {
        let started = Instant::now();
        self.requests.lock().unwrap().push(RecordedRequest {
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| (m.role.to_string(), m.content.clone()))
                .collect(),
        });

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        self.spans.lock().unwrap().push((started, Instant::now()));
        next.unwrap_or_else(|| Err(LlmError::Transport("script exhausted".to_string())))
    }
}
