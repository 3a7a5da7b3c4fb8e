//! Wire layer for the chat-completion provider.
//!
//! `ChatTransport` is the seam between retry/queue logic and the network:
//! it performs exactly one HTTP exchange and reports status, body and any
//! provider-supplied retry hint. It never retries and never classifies.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::LlmError;

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if the provider sent any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// A single raw provider exchange, success or not.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub status: u16,
    /// Parsed from the `Retry-After` header (seconds) when present.
    pub retry_after: Option<Duration>,
    pub body: String,
}

impl ProviderResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(
        &self,
        endpoint: &str,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ProviderResponse, LlmError>;
}

/// Production transport over `reqwest`.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(
        &self,
        endpoint: &str,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ProviderResponse, LlmError> {
        let response = self
            .client
            .post(endpoint)
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Transport(format!("request timed out: {e}"))
                } else {
                    LlmError::Transport(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok())
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok());

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Transport(format!("failed to read response body: {e}")))?;

        Ok(ProviderResponse {
            status,
            retry_after,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "be terse".to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: "hello".to_string(),
                },
            ],
            temperature: 0.7,
            max_tokens: 64,
        }
    }

    #[tokio::test]
    async fn test_http_transport_sends_bearer_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "max_tokens": 64,
                "messages": [{"role": "system"}, {"role": "user", "content": "hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "hi"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let endpoint = format!("{}/chat/completions", server.uri());
        let response = transport
            .send(&endpoint, "sk-test", &sample_request())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let parsed: ChatCompletionResponse = serde_json::from_str(&response.body).unwrap();
        assert_eq!(parsed.first_content(), Some("hi"));
    }

    #[tokio::test]
    async fn test_http_transport_reports_retry_after() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "7")
                    .set_body_string(r#"{"error":{"message":"slow down"}}"#),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let endpoint = format!("{}/chat/completions", server.uri());
        let response = transport
            .send(&endpoint, "sk-test", &sample_request())
            .await
            .unwrap();

        assert_eq!(response.status, 429);
        assert_eq!(response.retry_after, Some(Duration::from_secs(7)));
        assert!(response.body.contains("slow down"));
    }

    #[tokio::test]
    async fn test_http_transport_ignores_unrepresentable_retry_after() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "1e20")
                    .set_body_string(r#"{"error":{"message":"slow down"}}"#),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let endpoint = format!("{}/chat/completions", server.uri());
        let response = transport
            .send(&endpoint, "sk-test", &sample_request())
            .await
            .unwrap();

        assert_eq!(response.status, 429);
        assert!(response.retry_after.is_none());
    }

    #[tokio::test]
    async fn test_http_transport_connection_failure_is_transport_error() {
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) on localhost is almost never listening.
        let result = transport
            .send("http://127.0.0.1:9/chat/completions", "sk-test", &sample_request())
            .await;
        assert!(matches!(result, Err(LlmError::Transport(_))));
    }

    #[test]
    fn test_first_content_skips_blank() {
        let parsed: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"   "}}]}"#).unwrap();
        assert!(parsed.first_content().is_none());

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(empty.first_content().is_none());
    }
}
