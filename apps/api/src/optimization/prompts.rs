// All LLM prompt constants for the Optimization module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_FABRICATION_INSTRUCTION};
use crate::optimization::models::{ContentKind, OptimizationRequest};

/// Persona for resume (ATS) optimization. Combined with `JSON_ONLY_SYSTEM`.
pub const RESUME_SYSTEM: &str = "You are an expert resume writer and applicant tracking \
    system (ATS) specialist. You rewrite resumes so they pass ATS keyword screening for a \
    specific job posting while staying truthful.";

/// Persona for social post optimization. Combined with `JSON_ONLY_SYSTEM`.
pub const POST_SYSTEM: &str = "You are an expert professional-network copywriter. You \
    rewrite posts to maximize engagement while keeping the author's voice.";

/// Resume prompt. Replace: {no_fabrication}, {job_posting}, {content}
pub const RESUME_PROMPT_TEMPLATE: &str = r#"{no_fabrication}

Optimize the RESUME below for the JOB POSTING. Return a JSON object with this EXACT schema:
{
  "rewritten_text": "the full optimized resume as plain text",
  "score": 85,
  "suggestions": ["specific, actionable improvement"],
  "missing_keywords": ["keyword from the posting absent from the resume"]
}

Rules:
1. `score` is an integer from 0 to 100: how well the ORIGINAL resume matches the posting
2. The first line of `rewritten_text` MUST be the candidate's real name from the resume
3. Use keywords from the posting only where the resume supports them
4. `suggestions` are ordered by impact, most important first

JOB POSTING:
{job_posting}

RESUME:
{content}"#;

/// Post prompt. Replace: {no_fabrication}, {context}, {content}
pub const POST_PROMPT_TEMPLATE: &str = r##"{no_fabrication}

Optimize the POST below for engagement. Return a JSON object with this EXACT schema:
{
  "rewritten_text": "the optimized post",
  "score": 72,
  "suggestions": ["specific, actionable improvement"],
  "hashtags": ["#relevant"],
  "alternatives": ["an alternative opening line"]
}

Rules:
1. `score` is an integer from 0 to 100: predicted engagement of the ORIGINAL post
2. Keep the rewritten post under 3000 characters
3. At most 5 hashtags; at most 3 alternatives

ADDITIONAL CONTEXT:
{context}

POST:
{content}"##;

/// Builds the (system, user) prompt pair for a validated request.
pub fn build_prompts(request: &OptimizationRequest) -> (String, String) {
    let content = request.raw_content.trim();
    match request.content_kind {
        ContentKind::Resume => (
            format!("{RESUME_SYSTEM} {JSON_ONLY_SYSTEM}"),
            fill_template(
                RESUME_PROMPT_TEMPLATE,
                &[
                    ("no_fabrication", NO_FABRICATION_INSTRUCTION),
                    ("job_posting", request.context()),
                    ("content", content),
                ],
            ),
        ),
        ContentKind::Post => {
            let context = match request.context() {
                "" => "(none)",
                other => other,
            };
            (
                format!("{POST_SYSTEM} {JSON_ONLY_SYSTEM}"),
                fill_template(
                    POST_PROMPT_TEMPLATE,
                    &[
                        ("no_fabrication", NO_FABRICATION_INSTRUCTION),
                        ("context", context),
                        ("content", content),
                    ],
                ),
            )
        }
    }
}

/// Substitutes `{name}` slots in one pass over `template`. Inserted values are
/// never rescanned, so user text containing `{content}` stays literal.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let inserted: usize = values.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(template.len() + inserted);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let slot = tail.find('}').and_then(|close| {
            let name = &tail[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match slot {
            Some((value, close)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}
