//! Retry/backoff policy: classifies non-2xx provider responses.

use std::time::Duration;

use serde::Deserialize;

use super::transport::ProviderResponse;
use super::LlmError;

/// Terms that mark a 429 as quota/billing exhaustion rather than throttling.
const QUOTA_TERMS: &[&str] = &["quota", "billing", "insufficient_quota", "credit"];

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Why a failed dispatch may be resubmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    RateLimited,
    ServerError,
}

/// Outcome of classifying a non-success provider response.
#[derive(Debug)]
pub enum Classification {
    Retry {
        reason: RetryReason,
        /// Provider-specified wait; overrides the backoff schedule when set.
        retry_after: Option<Duration>,
        status: u16,
        message: String,
    },
    Terminal(LlmError),
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before the `retry`-th resubmission (1-based): base, 2×base, 4×base, …
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// True when a call that has made `attempts` dispatches may dispatch again.
    pub fn can_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }

    /// Terminal error for a retryable failure whose budget is spent.
    pub fn exhausted(&self, reason: RetryReason, status: u16, message: String) -> LlmError {
        match reason {
            RetryReason::RateLimited => LlmError::RateLimitExceeded {
                attempts: self.max_attempts,
            },
            RetryReason::ServerError => LlmError::Api {
                status: Some(status),
                message,
            },
        }
    }
}

/// Classifies a non-2xx provider response.
pub fn classify(response: &ProviderResponse) -> Classification {
    let (message, markers) = extract_error(&response.body);

    match response.status {
        429 => {
            let haystack = format!("{message} {markers}").to_lowercase();
            if QUOTA_TERMS.iter().any(|term| haystack.contains(term)) {
                return Classification::Terminal(LlmError::QuotaExceeded { message });
            }
            let retry_after = response
                .retry_after
                .or_else(|| parse_retry_hint(&message));
            Classification::Retry {
                reason: RetryReason::RateLimited,
                retry_after,
                status: 429,
                message,
            }
        }
        500 | 503 => Classification::Retry {
            reason: RetryReason::ServerError,
            retry_after: None,
            status: response.status,
            message,
        },
        401 => Classification::Terminal(LlmError::InvalidApiKey),
        status => Classification::Terminal(LlmError::Api {
            status: Some(status),
            message,
        }),
    }
}

/// Returns the provider's error message (or the raw body) and the
/// concatenated `type`/`code` markers, if the body is a structured error.
fn extract_error(body: &str) -> (String, String) {
    match serde_json::from_str::<ProviderError>(body) {
        Ok(parsed) => {
            let mut markers = parsed.error.error_type.unwrap_or_default();
            if let Some(code) = parsed.error.code {
                markers.push(' ');
                match code {
                    serde_json::Value::String(s) => markers.push_str(&s),
                    other => markers.push_str(&other.to_string()),
                }
            }
            let message = if parsed.error.message.is_empty() {
                body.trim().to_string()
            } else {
                parsed.error.message
            };
            (message, markers)
        }
        Err(_) => (body.trim().to_string(), String::new()),
    }
}

/// Parses hints like "Please try again in 20s", "try again in 350ms" or
/// "try again in 1m30s". Values too large for a `Duration` yield `None`.
fn parse_retry_hint(message: &str) -> Option<Duration> {
    let lower = message.to_lowercase();
    let start = lower.find("try again in")? + "try again in".len();
    let mut rest = lower[start..].trim_start();
    let mut total = Duration::ZERO;
    let mut parsed_any = false;

    loop {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            break;
        }
        let value: f64 = rest[..number_len].parse().ok()?;

        let after = if parsed_any {
            &rest[number_len..]
        } else {
            rest[number_len..].trim_start()
        };
        let unit_len = after
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(after.len());
        let secs = match &after[..unit_len] {
            "ms" => value / 1000.0,
            "s" => value,
            "m" => value * 60.0,
            _ => return None,
        };

        total = total.checked_add(Duration::try_from_secs_f64(secs).ok()?)?;
        parsed_any = true;
        rest = &after[unit_len..];
    }

    parsed_any.then_some(total)
}
