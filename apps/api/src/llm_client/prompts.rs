// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it;
// this file only contains cross-cutting pieces.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// Appended to every rewrite prompt.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Rewrite only what the original content supports. \
    Do NOT invent employers, dates, credentials, metrics, or names. \
    Keep the author's real name exactly as written in the original.";
