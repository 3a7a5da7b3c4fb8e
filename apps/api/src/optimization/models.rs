use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Resume,
    Post,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Resume => "resume",
            ContentKind::Post => "post",
        }
    }
}

/// A document plus instructions to be rewritten by the provider.
///
/// For `Resume`, `context_hint` is the target job posting and is mandatory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub content_kind: ContentKind,
    pub raw_content: String,
    #[serde(default)]
    pub context_hint: Option<String>,
}

#[cfg(test)]
impl OptimizationRequest {
    pub fn resume(raw_content: impl Into<String>, job_posting: impl Into<String>) -> Self {
        Self {
            content_kind: ContentKind::Resume,
            raw_content: raw_content.into(),
            context_hint: Some(job_posting.into()),
        }
    }

    pub fn post(raw_content: impl Into<String>, context_hint: Option<String>) -> Self {
        Self {
            content_kind: ContentKind::Post,
            raw_content: raw_content.into(),
            context_hint,
        }
    }
}

impl OptimizationRequest {
    /// Trimmed context, or "" when absent.
    pub fn context(&self) -> &str {
        self.context_hint.as_deref().map(str::trim).unwrap_or("")
    }
}

/// Kind-specific fields the provider returns alongside the rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResultExtra {
    Resume {
        missing_keywords: Vec<String>,
    },
    Post {
        hashtags: Vec<String>,
        alternatives: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub content_kind: ContentKind,
    pub rewritten_text: String,
    /// Always within 0..=100.
    pub score: u8,
    pub suggestions: Vec<String>,
    pub extra: ResultExtra,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}
