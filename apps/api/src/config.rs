use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Application configuration loaded from environment variables.
///
/// The provider credential and base URL are NOT required at startup: their
/// absence is reported per request as a validation failure.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
    pub optimize: OptimizeSettings,
    pub port: u16,
    pub rust_log: String,
}

/// Everything the outbound provider client needs.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
    /// Minimum spacing between two dispatched calls.
    pub min_interval: Duration,
    /// Total dispatches allowed for one call, first attempt included.
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

#[derive(Debug, Clone)]
pub struct OptimizeSettings {
    pub max_content_chars: usize,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub cache_key_prefix_chars: usize,
    pub repair_placeholder_names: bool,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            request_timeout: Duration::from_secs(60),
            min_interval: Duration::from_millis(1000),
            max_attempts: 3,
            backoff_base: Duration::from_millis(2000),
        }
    }
}

impl Default for OptimizeSettings {
    fn default() -> Self {
        Self {
            max_content_chars: 15_000,
            cache_ttl: Duration::from_secs(30 * 60),
            cache_capacity: 256,
            cache_key_prefix_chars: 500,
            repair_placeholder_names: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_defaults = LlmSettings::default();
        let optimize_defaults = OptimizeSettings::default();

        let llm = LlmSettings {
            api_key: std::env::var("LLM_API_KEY").unwrap_or_default(),
            base_url: std::env::var("LLM_BASE_URL").unwrap_or(llm_defaults.base_url),
            model: std::env::var("LLM_MODEL").unwrap_or(llm_defaults.model),
            temperature: parse_env("LLM_TEMPERATURE", llm_defaults.temperature)?,
            max_tokens: parse_env("LLM_MAX_TOKENS", llm_defaults.max_tokens)?,
            request_timeout: Duration::from_secs(parse_env(
                "LLM_TIMEOUT_SECS",
                llm_defaults.request_timeout.as_secs(),
            )?),
            min_interval: Duration::from_millis(parse_env(
                "LLM_MIN_INTERVAL_MS",
                llm_defaults.min_interval.as_millis() as u64,
            )?),
            max_attempts: parse_env("LLM_MAX_ATTEMPTS", llm_defaults.max_attempts)?.max(1),
            backoff_base: Duration::from_millis(parse_env(
                "LLM_BACKOFF_BASE_MS",
                llm_defaults.backoff_base.as_millis() as u64,
            )?),
        };

        let optimize = OptimizeSettings {
            max_content_chars: parse_env(
                "OPTIMIZE_MAX_CONTENT_CHARS",
                optimize_defaults.max_content_chars,
            )?,
            cache_ttl: Duration::from_secs(parse_env(
                "OPTIMIZE_CACHE_TTL_SECS",
                optimize_defaults.cache_ttl.as_secs(),
            )?),
            cache_capacity: parse_env("OPTIMIZE_CACHE_CAPACITY", optimize_defaults.cache_capacity)?,
            cache_key_prefix_chars: parse_env(
                "OPTIMIZE_CACHE_KEY_PREFIX",
                optimize_defaults.cache_key_prefix_chars,
            )?,
            repair_placeholder_names: parse_env(
                "OPTIMIZE_REPAIR_NAMES",
                optimize_defaults.repair_placeholder_names,
            )?,
        };

        Ok(Config {
            llm,
            optimize,
            port: parse_env("PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads `key` and parses it, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u32 = parse_env("RANKKIT_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("RANKKIT_TEST_GARBAGE_PORT", "not-a-number");
        let result: Result<u16> = parse_env("RANKKIT_TEST_GARBAGE_PORT", 8080);
        assert!(result.is_err());
        std::env::remove_var("RANKKIT_TEST_GARBAGE_PORT");
    }

    #[test]
    fn test_defaults_are_sane() {
        let llm = LlmSettings::default();
        assert!(llm.api_key.is_empty());
        assert_eq!(llm.base_url, DEFAULT_BASE_URL);
        assert!(llm.max_attempts >= 1);

        let optimize = OptimizeSettings::default();
        assert!(optimize.cache_key_prefix_chars < optimize.max_content_chars);
        assert!(optimize.cache_capacity > 0);
    }
}
