use crate::config::LlmSettings;
use crate::optimization::error::OptimizeError;
use crate::optimization::models::{ContentKind, OptimizationRequest};

/// Credential values shipped in templates and `.env.example` files.
const PLACEHOLDER_KEYS: &[&str] = &[
    "your-api-key",
    "your_api_key",
    "your-api-key-here",
    "your_api_key_here",
    "your-openai-api-key",
    "changeme",
    "change-me",
    "placeholder",
    "replace-me",
];

/// Rejects a request before it costs a network call. Pure; checks run in the
/// order the error codes are documented.
pub fn validate_request(
    request: &OptimizationRequest,
    max_content_chars: usize,
    llm: &LlmSettings,
) -> Result<(), OptimizeError> {
    if request.raw_content.trim().is_empty() {
        return Err(OptimizeError::InvalidInput);
    }

    let actual = request.raw_content.chars().count();
    if actual > max_content_chars {
        return Err(OptimizeError::ContentTooLong {
            actual,
            max: max_content_chars,
        });
    }

    if request.content_kind == ContentKind::Resume && request.context().is_empty() {
        return Err(OptimizeError::MissingContext);
    }

    if is_placeholder_key(&llm.api_key) {
        return Err(OptimizeError::ApiKeyMissing);
    }

    if llm.base_url.trim().is_empty() {
        return Err(OptimizeError::EndpointMissing);
    }

    Ok(())
}

/// True for empty keys, template values, and masked keys like `xxxx` / `sk-xxxx`.
pub fn is_placeholder_key(api_key: &str) -> bool {
    let key = api_key.trim().to_lowercase();
    if key.is_empty() {
        return true;
    }
    if PLACEHOLDER_KEYS.contains(&key.as_str()) {
        return true;
    }
    let body = key.strip_prefix("sk-").unwrap_or(&key);
    body.is_empty() || body.chars().all(|c| c == 'x' || c == '*' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm() -> LlmSettings {
        LlmSettings {
            api_key: "sk-proj-abc123".to_string(),
            ..LlmSettings::default()
        }
    }

    #[test]
    fn test_valid_resume_passes() {
        let request = OptimizationRequest::resume("Jane Smith\nEngineer", "Java developer role");
        assert!(validate_request(&request, 100, &llm()).is_ok());
    }

    #[test]
    fn test_post_without_context_passes() {
        let request = OptimizationRequest::post("Excited to share a launch", None);
        assert!(validate_request(&request, 100, &llm()).is_ok());
    }

    #[test]
    fn test_whitespace_content_is_invalid_input() {
        for content in ["", "   ", "\n\t  \n"] {
            let request = OptimizationRequest::post(content, None);
            let err = validate_request(&request, 100, &llm()).unwrap_err();
            assert_eq!(err.code(), "INVALID_INPUT", "content {content:?}");
        }
    }

    #[test]
    fn test_too_long_counts_characters_not_bytes() {
        let request = OptimizationRequest::post("é".repeat(10), None);
        assert!(validate_request(&request, 10, &llm()).is_ok());

        let request = OptimizationRequest::post("é".repeat(11), None);
        match validate_request(&request, 10, &llm()) {
            Err(OptimizeError::ContentTooLong { actual, max }) => {
                assert_eq!(actual, 11);
                assert_eq!(max, 10);
            }
            other => panic!("expected CONTENT_TOO_LONG, got {other:?}"),
        }
    }

    #[test]
    fn test_resume_without_context_is_missing_context() {
        let mut request = OptimizationRequest::resume("Jane Smith", "   ");
        assert_eq!(
            validate_request(&request, 100, &llm()).unwrap_err().code(),
            "MISSING_CONTEXT"
        );
        request.context_hint = None;
        assert_eq!(
            validate_request(&request, 100, &llm()).unwrap_err().code(),
            "MISSING_CONTEXT"
        );
    }

    #[test]
    fn test_input_errors_win_over_missing_key() {
        let no_key = LlmSettings::default();
        let request = OptimizationRequest::resume("  ", "");
        assert_eq!(
            validate_request(&request, 100, &no_key).unwrap_err().code(),
            "INVALID_INPUT"
        );
    }

    #[test]
    fn test_missing_or_placeholder_key() {
        let request = OptimizationRequest::post("hello", None);
        for key in ["", "  ", "your-api-key", "YOUR_API_KEY_HERE", "sk-...", "sk-xxx", "sk-xxxxxxxx", "xxxx"] {
            let settings = LlmSettings {
                api_key: key.to_string(),
                ..LlmSettings::default()
            };
            assert_eq!(
                validate_request(&request, 100, &settings).unwrap_err().code(),
                "API_KEY_MISSING",
                "key {key:?}"
            );
        }
    }

    #[test]
    fn test_real_looking_keys_are_accepted() {
        assert!(!is_placeholder_key("sk-proj-4f9a8b7c6d"));
        assert!(!is_placeholder_key("sk-ant-api03-xyz"));
    }

    #[test]
    fn test_empty_base_url_is_endpoint_missing() {
        let request = OptimizationRequest::post("hello", None);
        let settings = LlmSettings {
            base_url: " ".to_string(),
            ..llm()
        };
        assert_eq!(
            validate_request(&request, 100, &settings).unwrap_err().code(),
            "ENDPOINT_MISSING"
        );
    }
}
