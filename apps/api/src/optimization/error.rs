use thiserror::Error;

use crate::llm_client::LlmError;

/// Every way an optimization can fail. `code()` is the machine-readable tag
/// surfaced to callers.
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("Content is empty")]
    InvalidInput,

    #[error("Content is {actual} characters; the limit is {max}")]
    ContentTooLong { actual: usize, max: usize },

    #[error("A job posting is required to optimize a resume")]
    MissingContext,

    #[error("No provider API key is configured")]
    ApiKeyMissing,

    #[error("No provider endpoint is configured")]
    EndpointMissing,

    #[error("Provider quota exhausted: {0}")]
    QuotaExceeded(String),

    #[error("Provider rate limit still exceeded after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    #[error("Provider rejected the API key")]
    InvalidApiKey,

    #[error("Provider error{}: {message}", status_suffix(.status))]
    Api { status: Option<u16>, message: String },

    #[error("Could not parse provider response: {0}")]
    Parse(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

impl OptimizeError {
    pub fn code(&self) -> &'static str {
        match self {
            OptimizeError::InvalidInput => "INVALID_INPUT",
            OptimizeError::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            OptimizeError::MissingContext => "MISSING_CONTEXT",
            OptimizeError::ApiKeyMissing => "API_KEY_MISSING",
            OptimizeError::EndpointMissing => "ENDPOINT_MISSING",
            OptimizeError::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            OptimizeError::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            OptimizeError::InvalidApiKey => "INVALID_API_KEY",
            OptimizeError::Api { .. } => "API_ERROR",
            OptimizeError::Parse(_) => "PARSE_ERROR",
        }
    }

    /// True for failures detected before any network call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            OptimizeError::InvalidInput
                | OptimizeError::ContentTooLong { .. }
                | OptimizeError::MissingContext
                | OptimizeError::ApiKeyMissing
                | OptimizeError::EndpointMissing
        )
    }
}

impl From<LlmError> for OptimizeError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::QuotaExceeded { message } => OptimizeError::QuotaExceeded(message),
            LlmError::RateLimitExceeded { attempts } => {
                OptimizeError::RateLimitExceeded { attempts }
            }
            LlmError::InvalidApiKey => OptimizeError::InvalidApiKey,
            LlmError::Api { status, message } => OptimizeError::Api { status, message },
            LlmError::Transport(message) => OptimizeError::Api {
                status: None,
                message,
            },
            LlmError::MalformedBody(e) => OptimizeError::Parse(e.to_string()),
            LlmError::EmptyContent => {
                OptimizeError::Parse("provider returned no content".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            OptimizeError::InvalidInput,
            OptimizeError::ContentTooLong { actual: 2, max: 1 },
            OptimizeError::MissingContext,
            OptimizeError::ApiKeyMissing,
            OptimizeError::EndpointMissing,
            OptimizeError::QuotaExceeded(String::new()),
            OptimizeError::RateLimitExceeded { attempts: 3 },
            OptimizeError::InvalidApiKey,
            OptimizeError::Api {
                status: None,
                message: String::new(),
            },
            OptimizeError::Parse(String::new()),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_transport_failure_becomes_api_error_without_status() {
        let err: OptimizeError = LlmError::Transport("timed out".to_string()).into();
        assert_eq!(err.code(), "API_ERROR");
        assert!(matches!(err, OptimizeError::Api { status: None, .. }));
        assert!(!err.is_local());
    }

    #[test]
    fn test_empty_content_becomes_parse_error() {
        let err: OptimizeError = LlmError::EmptyContent.into();
        assert_eq!(err.code(), "PARSE_ERROR");
    }

    #[test]
    fn test_api_error_message_includes_status() {
        let err = OptimizeError::Api {
            status: Some(400),
            message: "bad request".to_string(),
        };
        assert_eq!(err.to_string(), "Provider error (status 400): bad request");
    }
}
