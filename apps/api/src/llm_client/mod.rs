/// LLM Client: the single point of entry for all chat-completion calls in RankKit.
///
/// ARCHITECTURAL RULE: No other module may call the provider directly.
/// All LLM interactions MUST go through this module, which applies, in order:
/// single-flight lane → throttle → dispatch → classify → backoff → redispatch.
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::LlmSettings;

pub mod prompts;
pub mod queue;
pub mod retry;
pub mod throttle;
pub mod transport;

#[cfg(test)]
pub mod testing;

use queue::{credential_fingerprint, RequestQueue};
use retry::{classify, Classification, RetryPolicy};
use throttle::Throttle;
use transport::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatTransport, Usage};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Provider quota exhausted: {message}")]
    QuotaExceeded { message: String },

    #[error("Rate limited after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    #[error("Provider rejected the API key")]
    InvalidApiKey,

    #[error("API error (status {}): {message}", fmt_status(.status))]
    Api { status: Option<u16>, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Provider response body is malformed: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}

/// Text of a successful completion plus bookkeeping for logs.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: Option<Usage>,
    pub attempts: u32,
}

/// The single LLM client used by all services in RankKit.
///
/// Cheap to clone; the queue and throttle are shared between clones.
#[derive(Clone)]
pub struct LlmClient {
    transport: Arc<dyn ChatTransport>,
    settings: LlmSettings,
    queue: Arc<RequestQueue>,
    throttle: Arc<Throttle>,
}

impl LlmClient {
    pub fn new(transport: Arc<dyn ChatTransport>, settings: LlmSettings) -> Self {
        let throttle = Arc::new(Throttle::new(settings.min_interval));
        Self {
            transport,
            settings,
            queue: Arc::new(RequestQueue::new()),
            throttle,
        }
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.settings.max_attempts.max(1),
            base_delay: self.settings.backoff_base,
        }
    }

    /// Sends one system + user prompt pair and returns the first choice's text.
    ///
    /// Holds this credential's lane until the call settles, so provider calls
    /// happen strictly in submission order.
    pub async fn complete(&self, system: &str, prompt: &str) -> Result<Completion, LlmError> {
        let request = ChatCompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let lane = credential_fingerprint(&self.settings.api_key);
        let _guard = self.queue.acquire(&lane).await;
        debug!(lane = %lane, "acquired provider lane");

        let endpoint = self.endpoint();
        let policy = self.policy();
        let mut attempts = 0u32;

        loop {
            self.throttle.wait().await;
            attempts += 1;

            let response = self
                .transport
                .send(&endpoint, &self.settings.api_key, &request)
                .await?;

            if response.is_success() {
                let parsed: ChatCompletionResponse = serde_json::from_str(&response.body)?;
                let text = parsed
                    .first_content()
                    .ok_or(LlmError::EmptyContent)?
                    .to_string();

                if let Some(usage) = parsed.usage {
                    debug!(
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        "token usage"
                    );
                }
                info!(attempts, model = %self.settings.model, "LLM call succeeded");

                return Ok(Completion {
                    text,
                    usage: parsed.usage,
                    attempts,
                });
            }

            match classify(&response) {
                Classification::Terminal(err) => {
                    warn!(status = response.status, error = %err, "LLM call failed");
                    return Err(err);
                }
                Classification::Retry {
                    reason,
                    retry_after,
                    status,
                    message,
                } => {
                    if !policy.can_retry(attempts) {
                        let err = policy.exhausted(reason, status, message);
                        warn!(attempts, status, error = %err, "LLM retry budget exhausted");
                        return Err(err);
                    }

                    let delay = retry_after.unwrap_or_else(|| policy.backoff(attempts));
                    warn!(
                        attempt = attempts,
                        max_attempts = policy.max_attempts,
                        status,
                        delay_ms = delay.as_millis() as u64,
                        provider_delay = retry_after.is_some(),
                        "LLM call failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
