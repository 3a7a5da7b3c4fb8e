//! Optimizer: the request pipeline.
//!
//! Flow: validate → cache lookup → build prompts → LLM call (queued,
//! throttled, retried) → parse → cache store → return.

use chrono::Utc;
use tracing::{info, warn};

use crate::config::OptimizeSettings;
use crate::llm_client::LlmClient;
use crate::optimization::cache::{CacheStats, ResultCache};
use crate::optimization::error::OptimizeError;
use crate::optimization::models::{OptimizationRequest, OptimizationResult};
use crate::optimization::parser::parse_response;
use crate::optimization::prompts::build_prompts;
use crate::optimization::validator::validate_request;

/// Owns all process-wide optimization state: the result cache and, through
/// the LLM client, the dispatch queue and throttle.
pub struct Optimizer {
    llm: LlmClient,
    cache: ResultCache,
    settings: OptimizeSettings,
}

impl Optimizer {
    pub fn new(llm: LlmClient, settings: OptimizeSettings) -> Self {
        let cache = ResultCache::new(
            settings.cache_capacity,
            settings.cache_ttl,
            settings.cache_key_prefix_chars,
        );
        Self {
            llm,
            cache,
            settings,
        }
    }

    pub async fn optimize(
        &self,
        request: &OptimizationRequest,
    ) -> Result<OptimizationResult, OptimizeError> {
        validate_request(request, self.settings.max_content_chars, self.llm.settings())?;

        if let Some(hit) = self.cache.get(request) {
            info!(kind = request.content_kind.as_str(), "optimization served from cache");
            return Ok(hit);
        }

        let (system, prompt) = build_prompts(request);
        let completion = self.llm.complete(&system, &prompt).await.map_err(|e| {
            warn!(kind = request.content_kind.as_str(), error = %e, "optimization call failed");
            OptimizeError::from(e)
        })?;

        let payload = parse_response(
            request.content_kind,
            &completion.text,
            &request.raw_content,
            self.settings.repair_placeholder_names,
        )?;

        let result = OptimizationResult {
            content_kind: request.content_kind,
            rewritten_text: payload.rewritten_text,
            score: payload.score,
            suggestions: payload.suggestions,
            extra: payload.extra,
            model: self.llm.settings().model.clone(),
            generated_at: Utc::now(),
        };

        self.cache.set(request, result.clone());
        info!(
            kind = request.content_kind.as_str(),
            score = result.score,
            attempts = completion.attempts,
            tokens = completion
                .usage
                .map(|u| u.prompt_tokens + u.completion_tokens),
            "optimization complete"
        );
        Ok(result)
    }

    /// Drops all cached results. Returns how many were removed.
    pub fn clear_cache(&self) -> usize {
        let removed = self.cache.clear();
        info!(removed, "optimization cache cleared");
        removed
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
